//! External collaborators of the FitTrack client.
//!
//! The client only ever talks to two managed services, each behind a narrow
//! async trait:
//!
//! - [`AuthProvider`]: email/password accounts and session tokens.
//! - [`DocumentStore`]: collections of documents with snapshot listeners.
//!
//! [`InMemoryAuthProvider`] and [`InMemoryDocumentStore`] are complete
//! in-process implementations used by the shell and the test suites.

pub mod auth;
pub mod config;
pub mod documents;

pub use auth::memory::InMemoryAuthProvider;
pub use auth::{AuthProvider, AuthSession};
pub use config::BackendConfig;
pub use documents::memory::InMemoryDocumentStore;
pub use documents::{Document, DocumentStore, Listener, Snapshot};
