//! Loader state: is any tracked operation still in flight?
//!
//! The coordinator counts in-flight operations instead of holding a single
//! flag, so one operation finishing never clears the busy state of another
//! that is still running. Every acquisition returns a [`BusyGuard`] whose drop
//! releases it, including on early returns and `?` propagation.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use fittrack_events::{AppEvent, EventBus, EventKind};

pub struct BusyCoordinator {
    /// Count of live guards. The lock also orders the edge events.
    in_flight: Mutex<usize>,
    bus: Arc<EventBus>,
}

impl BusyCoordinator {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            in_flight: Mutex::new(0),
            bus,
        }
    }

    /// Mark one operation as in flight until the returned guard is dropped.
    pub fn acquire(&self, label: &'static str) -> BusyGuard<'_> {
        let mut count = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        *count += 1;
        if *count == 1 {
            self.bus
                .publish(AppEvent::new(EventKind::BusyChanged { busy: true }));
        }
        tracing::trace!(label, in_flight = *count, "Busy acquired");
        BusyGuard {
            coordinator: self,
            label,
        }
    }

    /// Run `fut` with a guard held for its whole duration.
    pub async fn track<F: Future>(&self, label: &'static str, fut: F) -> F::Output {
        let _guard = self.acquire(label);
        fut.await
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight() > 0
    }

    pub fn in_flight(&self) -> usize {
        *self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release(&self, label: &'static str) {
        let mut count = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.bus
                .publish(AppEvent::new(EventKind::BusyChanged { busy: false }));
        }
        tracing::trace!(label, in_flight = *count, "Busy released");
    }
}

/// Releases its share of the busy state when dropped.
#[must_use = "the operation is only tracked while the guard is alive"]
pub struct BusyGuard<'a> {
    coordinator: &'a BusyCoordinator,
    label: &'static str,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.coordinator.release(self.label);
    }
}
