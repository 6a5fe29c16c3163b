//! Navigation gate.
//!
//! Two states, derived from the session store on every read:
//! `Unauthenticated` and `Authenticated`. The gate never calls the session
//! store's operations. It keeps a route stack for the current flow and
//! resets it to the flow entry whenever the session generation moves, which
//! is how sign-in lands on `Home` and sign-out lands on `Login`.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use fittrack_core::types::RecordId;

use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Unauthenticated,
    Authenticated,
}

impl GateState {
    fn entry(self) -> Route {
        match self {
            Self::Unauthenticated => Route::Login,
            Self::Authenticated => Route::Home,
        }
    }
}

/// What the workout editor was opened for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorTarget {
    New,
    Existing(RecordId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Welcome,
    Login,
    Register,
    Home,
    Workouts,
    WorkoutEditor(EditorTarget),
    Settings,
}

impl Route {
    /// The dashboard tabs, in display order.
    pub fn tabs() -> [Route; 3] {
        [Route::Home, Route::Workouts, Route::Settings]
    }

    /// Which flow the route belongs to.
    pub fn flow(&self) -> GateState {
        match self {
            Self::Welcome | Self::Login | Self::Register => GateState::Unauthenticated,
            Self::Home | Self::Workouts | Self::WorkoutEditor(_) | Self::Settings => {
                GateState::Authenticated
            }
        }
    }

    pub fn is_tab(&self) -> bool {
        matches!(self, Self::Home | Self::Workouts | Self::Settings)
    }

    pub fn path(&self) -> String {
        match self {
            Self::Welcome => "/".to_string(),
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::Home => "/home".to_string(),
            Self::Workouts => "/tasks".to_string(),
            Self::WorkoutEditor(EditorTarget::New) => "/tasks/new".to_string(),
            Self::WorkoutEditor(EditorTarget::Existing(id)) => format!("/tasks/{id}"),
            Self::Settings => "/settings".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

static FALLBACK_ROUTE: Route = Route::Welcome;

struct RouteStack {
    routes: Vec<Route>,
    /// Session generation the stack was built for.
    generation: u64,
}

impl RouteStack {
    fn top(&self) -> &Route {
        // Never empty: every mutation leaves at least the flow root.
        self.routes.last().unwrap_or(&FALLBACK_ROUTE)
    }
}

pub struct NavigationGate {
    session: Arc<SessionStore>,
    stack: Mutex<RouteStack>,
}

impl NavigationGate {
    /// A gate on the welcome screen.
    pub fn new(session: Arc<SessionStore>) -> Self {
        let generation = session.generation();
        Self {
            session,
            stack: Mutex::new(RouteStack {
                routes: vec![Route::Welcome],
                generation,
            }),
        }
    }

    pub fn state(&self) -> GateState {
        let (_, signed_in) = self.session.status();
        state_for(signed_in)
    }

    /// The route currently on screen.
    pub fn current(&self) -> Route {
        self.with_stack(|stack, _| stack.top().clone())
    }

    /// Routes from the flow root to the current route.
    pub fn history(&self) -> Vec<Route> {
        self.with_stack(|stack, _| stack.routes.clone())
    }

    /// Open `route`. Tabs become the new flow root; other routes are pushed.
    ///
    /// A route from the other flow is refused and the flow entry is shown
    /// instead. Returns the route now on screen.
    pub fn navigate(&self, route: Route) -> Route {
        self.with_stack(|stack, state| {
            if route.flow() != state {
                tracing::warn!(requested = %route, ?state, "Route outside the current flow, redirecting");
                stack.routes = vec![state.entry()];
            } else if route.is_tab() {
                stack.routes = vec![route];
            } else if *stack.top() != route {
                stack.routes.push(route);
            }
            stack.top().clone()
        })
    }

    /// Swap the current route for `route`.
    pub fn replace(&self, route: Route) -> Route {
        self.with_stack(|stack, state| {
            if route.flow() != state {
                tracing::warn!(requested = %route, ?state, "Route outside the current flow, redirecting");
                stack.routes = vec![state.entry()];
            } else {
                stack.routes.pop();
                stack.routes.push(route);
            }
            stack.top().clone()
        })
    }

    /// Return to the previous route. The flow root stays put.
    pub fn back(&self) -> Route {
        self.with_stack(|stack, _| {
            if stack.routes.len() > 1 {
                stack.routes.pop();
            }
            stack.top().clone()
        })
    }

    /// Bring the stack in line with the session before running `f`.
    fn with_stack<T>(&self, f: impl FnOnce(&mut RouteStack, GateState) -> T) -> T {
        let mut stack = self.stack.lock().unwrap_or_else(PoisonError::into_inner);
        let (generation, signed_in) = self.session.status();
        let state = state_for(signed_in);

        if stack.generation != generation || stack.top().flow() != state {
            let entry = state.entry();
            tracing::info!(from = %stack.top(), to = %entry, ?state, "Session changed, resetting navigation");
            stack.routes = vec![entry];
            stack.generation = generation;
        }

        f(&mut stack, state)
    }
}

fn state_for(signed_in: bool) -> GateState {
    if signed_in {
        GateState::Authenticated
    } else {
        GateState::Unauthenticated
    }
}
