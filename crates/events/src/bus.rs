//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the central publish/subscribe hub for [`AppEvent`]s.
//! It is designed to be shared via `Arc<EventBus>` across the client.

use chrono::{DateTime, Utc};
use fittrack_core::types::UserId;
use fittrack_core::Identity;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::notice::Notice;

// ---------------------------------------------------------------------------
// AppEvent
// ---------------------------------------------------------------------------

/// What happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// The active identity changed. `None` means signed out.
    SessionChanged { identity: Option<Identity> },

    /// An account was created. It is not signed in yet.
    AccountRegistered { uid: UserId },

    /// The busy indicator flipped.
    BusyChanged { busy: bool },

    /// A subscription replaced its local mirror with a fresh snapshot.
    SnapshotApplied { collection: String, count: usize },

    /// Something the user should be told about.
    Notice(Notice),
}

impl EventKind {
    /// Dot-separated event name used in logs, e.g. `"session.changed"`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SessionChanged { .. } => "session.changed",
            Self::AccountRegistered { .. } => "account.registered",
            Self::BusyChanged { .. } => "busy.changed",
            Self::SnapshotApplied { .. } => "collection.snapshot",
            Self::Notice(_) => "notice",
        }
    }
}

/// An event that occurred in the client.
///
/// Constructed via [`AppEvent::new`] and optionally enriched with
/// [`with_actor`](AppEvent::with_actor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppEvent {
    pub kind: EventKind,

    /// Id of the signed-in user at the time of the event, if any.
    pub actor_uid: Option<UserId>,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl AppEvent {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            actor_uid: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach the acting user to the event.
    pub fn with_actor(mut self, uid: impl Into<UserId>) -> Self {
        self.actor_uid = Some(uid.into());
        self
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

impl From<Notice> for AppEvent {
    fn from(notice: Notice) -> Self {
        Self::new(EventKind::Notice(notice))
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
pub const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`AppEvent`]. Subscribers only see
/// events published after they subscribed; there is no replay.
///
/// # Usage
///
/// ```rust
/// use fittrack_events::bus::{AppEvent, EventBus, EventKind};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(AppEvent::new(EventKind::BusyChanged { busy: true }));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: impl Into<AppEvent>) {
        // A send error only means nobody is subscribed.
        let _ = self.sender.send(event.into());
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// Number of live receivers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
