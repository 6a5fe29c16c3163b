//! Structured logging of bus traffic.
//!
//! [`EventLogger`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! broadcast channel and traces every received [`AppEvent`]. It runs as a
//! long-lived background task and exits when the bus sender is dropped.

use tokio::sync::broadcast;

use crate::bus::{AppEvent, EventKind};

/// Background service that writes every event to the tracing subscriber.
pub struct EventLogger;

impl EventLogger {
    /// Run the logging loop until the channel closes.
    ///
    /// Returns the number of events logged.
    pub async fn run(mut receiver: broadcast::Receiver<AppEvent>) -> u64 {
        let mut logged = 0;
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    Self::log(&event);
                    logged += 1;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event logger lagged, some events were not logged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::debug!(logged, "Event bus closed, logger shutting down");
                    break;
                }
            }
        }
        logged
    }

    fn log(event: &AppEvent) {
        let actor = event.actor_uid.as_deref().unwrap_or("-");
        match &event.kind {
            EventKind::SessionChanged { identity } => tracing::info!(
                event = event.name(),
                actor,
                signed_in = identity.is_some(),
                "Session changed"
            ),
            EventKind::AccountRegistered { uid } => {
                tracing::info!(event = event.name(), %uid, "Account registered")
            }
            EventKind::BusyChanged { busy } => {
                tracing::debug!(event = event.name(), busy, "Busy state changed")
            }
            EventKind::SnapshotApplied { collection, count } => tracing::debug!(
                event = event.name(),
                %collection,
                count,
                "Snapshot applied"
            ),
            EventKind::Notice(notice) => tracing::info!(
                event = event.name(),
                actor,
                level = ?notice.level,
                title = %notice.title,
                message = %notice.message,
                "Notice raised"
            ),
        }
    }
}
