//! FitTrack in-process event bus.
//!
//! - [`EventBus`]: publish/subscribe hub backed by `tokio::sync::broadcast`.
//! - [`AppEvent`]: the event envelope: session and busy transitions,
//!   collection snapshots and user-facing notices.
//! - [`EventLogger`]: background task that traces every event.

pub mod bus;
pub mod logger;
pub mod notice;

pub use bus::{AppEvent, EventBus, EventKind};
pub use logger::EventLogger;
pub use notice::{Notice, NoticeLevel};
