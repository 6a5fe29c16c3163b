use std::sync::Arc;

use fittrack_backend::{InMemoryAuthProvider, InMemoryDocumentStore};
use fittrack_client::{AppState, ClientConfig};

/// In-memory providers shared by the tests, kept so a test can take one
/// offline or inspect it.
pub struct TestBackend {
    pub auth: Arc<InMemoryAuthProvider>,
    pub store: Arc<InMemoryDocumentStore>,
}

/// Build an `AppState` wired to fresh in-memory providers with default
/// configuration.
pub fn build_test_state() -> (AppState, TestBackend) {
    let auth = Arc::new(InMemoryAuthProvider::default());
    let store = Arc::new(InMemoryDocumentStore::new());
    let state = AppState::init(ClientConfig::default(), auth.clone(), store.clone());
    (state, TestBackend { auth, store })
}

/// Register `email` with the test password and sign in.
pub async fn signed_in_as(state: &AppState, email: &str) -> fittrack_core::Identity {
    state
        .session
        .register(email, TEST_PASSWORD)
        .await
        .expect("registration should succeed");
    state
        .session
        .login(email, TEST_PASSWORD)
        .await
        .expect("login should succeed")
}

pub const TEST_PASSWORD: &str = "secret1";
