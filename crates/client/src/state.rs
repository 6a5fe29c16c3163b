use std::sync::Arc;

use fittrack_backend::{AuthProvider, DocumentStore};
use fittrack_events::{AppEvent, EventBus, EventKind, Notice};

use crate::busy::BusyCoordinator;
use crate::config::ClientConfig;
use crate::gate::NavigationGate;
use crate::session::SessionStore;
use crate::sync::WorkoutSync;

/// Process-wide client state, handed to every screen and flow.
///
/// Cheaply cloneable: every component sits behind an `Arc`. Created once
/// with [`AppState::init`] and torn down with [`AppState::shutdown`].
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ClientConfig>,
    pub bus: Arc<EventBus>,
    pub session: Arc<SessionStore>,
    pub busy: Arc<BusyCoordinator>,
    pub workouts: Arc<WorkoutSync>,
    pub gate: Arc<NavigationGate>,
}

impl AppState {
    /// Wire every component to the given providers. Starts signed out.
    pub fn init(
        config: ClientConfig,
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        let bus = Arc::new(EventBus::new(config.event_capacity));
        let session = Arc::new(SessionStore::new(auth, Arc::clone(&bus)));
        let busy = Arc::new(BusyCoordinator::new(Arc::clone(&bus)));
        let workouts = Arc::new(WorkoutSync::new(
            store,
            config.workouts_collection.clone(),
            Arc::clone(&bus),
        ));
        let gate = Arc::new(NavigationGate::new(Arc::clone(&session)));

        tracing::info!(
            collection = %config.workouts_collection,
            "Client state initialized"
        );

        Self {
            config: Arc::new(config),
            bus,
            session,
            busy,
            workouts,
            gate,
        }
    }

    /// Publish a notice, tagged with the signed-in user if there is one.
    pub fn notify(&self, notice: Notice) {
        let mut event = AppEvent::new(EventKind::Notice(notice));
        if let Some(identity) = self.session.current() {
            event = event.with_actor(identity.uid);
        }
        self.bus.publish(event);
    }

    /// Stop every live subscription and release this handle.
    ///
    /// The bus itself closes only when the last clone of this state is
    /// dropped; background listeners such as the event logger exit then.
    pub fn shutdown(self) {
        self.workouts.shutdown();
        tracing::info!(in_flight = self.busy.in_flight(), "Client state shut down");
    }
}
