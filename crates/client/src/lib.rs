//! FitTrack client core.
//!
//! The pieces every screen depends on, wired together by [`AppState`]:
//!
//! - [`SessionStore`]: who is signed in; login, logout, registration.
//! - [`WorkoutSync`]: live mirror of the workout collection plus its
//!   create/update/delete operations.
//! - [`NavigationGate`]: keeps navigation inside the flow that matches the
//!   session.
//! - [`BusyCoordinator`]: counts in-flight operations for the loader.
//! - [`flows`]: the screen-boundary sequences (validate, mark busy, call,
//!   notify, navigate).

pub mod busy;
pub mod config;
pub mod flows;
pub mod gate;
pub mod session;
pub mod state;
pub mod sync;

pub use busy::{BusyCoordinator, BusyGuard};
pub use config::ClientConfig;
pub use gate::{EditorTarget, GateState, NavigationGate, Route};
pub use session::{SessionStore, SessionWatcher};
pub use state::AppState;
pub use sync::{Subscription, WorkoutSync};
