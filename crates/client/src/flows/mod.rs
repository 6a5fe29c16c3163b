//! Screen-boundary flows.
//!
//! Each flow is the sequence a screen runs when the user acts: validate
//! locally, hold a busy guard around the remote call, turn the outcome into a
//! [`Notice`](fittrack_events::Notice), then navigate. Failures are logged and
//! reported once; nothing is retried.

pub mod auth;
pub mod workouts;

pub use auth::{sign_out, LoginForm, RegisterForm};
pub use workouts::{delete_workout, SaveOutcome, WorkoutEditor};

use fittrack_core::CoreError;
use fittrack_events::Notice;

use crate::state::AppState;

/// Log `err` and raise an error notice titled `title`.
///
/// Validation failures are the user's to fix, so they are not logged as
/// errors.
fn report_failure(state: &AppState, title: &str, action: &'static str, err: &CoreError) {
    if err.is_validation() {
        tracing::debug!(action, error = %err, "Rejected by validation");
    } else {
        tracing::error!(action, error = %err, "Operation failed");
    }
    state.notify(Notice::error(title, err.user_message()));
}
