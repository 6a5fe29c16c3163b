//! FitTrack domain core.
//!
//! Types and rules shared by every other crate. Apart from reading
//! environment variables in [`config`], nothing in here performs I/O:
//!
//! - [`identity`]: the authenticated user handle.
//! - [`workout`]: workout records, drafts, patches and their field mapping.
//! - [`error`]: the error taxonomy and its user-facing messages.
//! - [`validation`]: client-side checks run before any remote call.
//! - [`config`]: environment variable parsing shared by the config types.

pub mod config;
pub mod error;
pub mod identity;
pub mod types;
pub mod validation;
pub mod workout;

pub use config::ConfigError;
pub use error::{AuthError, CoreError, StoreError};
pub use identity::Identity;
pub use workout::{WorkoutDraft, WorkoutPatch, WorkoutRecord};
