//! Session store: the single owner of the signed-in identity.
//!
//! Each sign-in, restore and sign-out is a transition. A transition bumps the
//! session generation and publishes [`EventKind::SessionChanged`] on the bus
//! before the operation returns. Registration creates an account but does not
//! sign it in.

use std::sync::Arc;

use fittrack_backend::{AuthProvider, AuthSession};
use fittrack_core::{AuthError, CoreError, Identity};
use fittrack_events::{AppEvent, EventBus, EventKind};
use tokio::sync::{broadcast, watch};

#[derive(Debug, Clone, Default)]
struct SessionState {
    active: Option<AuthSession>,
    /// Incremented on every transition.
    generation: u64,
}

pub struct SessionStore {
    auth: Arc<dyn AuthProvider>,
    bus: Arc<EventBus>,
    state: watch::Sender<SessionState>,
}

impl SessionStore {
    /// A store that starts signed out.
    pub fn new(auth: Arc<dyn AuthProvider>, bus: Arc<EventBus>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self { auth, bus, state }
    }

    pub fn current(&self) -> Option<Identity> {
        self.state.borrow().active.as_ref().map(|s| s.identity.clone())
    }

    pub fn is_signed_in(&self) -> bool {
        self.state.borrow().active.is_some()
    }

    /// Opaque token of the active session, for a host that wants to persist
    /// it and call [`restore`](Self::restore) on the next start.
    pub fn token(&self) -> Option<String> {
        self.state.borrow().active.as_ref().map(|s| s.token.clone())
    }

    /// Number of transitions since the store was created.
    pub fn generation(&self) -> u64 {
        self.state.borrow().generation
    }

    /// Generation and signed-in flag read together.
    pub(crate) fn status(&self) -> (u64, bool) {
        let state = self.state.borrow();
        (state.generation, state.active.is_some())
    }

    /// Observe future transitions. Nothing that happened before is replayed.
    pub fn subscribe(&self) -> SessionWatcher {
        SessionWatcher {
            receiver: self.bus.subscribe(),
        }
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<Identity, CoreError> {
        self.register_with_profile(email, password, None).await
    }

    /// Create an account with an optional display name. The caller still has
    /// to [`login`](Self::login) afterwards.
    pub async fn register_with_profile(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<Identity, CoreError> {
        let identity = self
            .auth
            .create_account(email, password, display_name)
            .await?;

        tracing::info!(uid = %identity.uid, "Account registered");
        self.bus.publish(AppEvent::new(EventKind::AccountRegistered {
            uid: identity.uid.clone(),
        }));
        Ok(identity)
    }

    /// Sign in and make the identity current.
    ///
    /// Every authentication failure surfaces as
    /// [`AuthError::InvalidCredential`]; only provider outages keep their own
    /// variant.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, CoreError> {
        let session = self
            .auth
            .sign_in(email, password)
            .await
            .map_err(|e| match e {
                AuthError::Unavailable(_) => e,
                _ => AuthError::InvalidCredential,
            })?;
        Ok(self.establish(session).await)
    }

    /// Resume a session from a token returned by [`token`](Self::token).
    ///
    /// On failure the store is left untouched: signed out on a cold start,
    /// and still holding the current session otherwise.
    pub async fn restore(&self, token: &str) -> Result<Identity, CoreError> {
        let session = self.auth.resume(token).await.map_err(|e| match e {
            AuthError::Unavailable(_) => e,
            _ => AuthError::InvalidToken,
        })?;
        Ok(self.establish(session).await)
    }

    /// Clear the active session.
    ///
    /// Signing out while signed out does nothing and notifies nobody. The
    /// local session is cleared even if the provider cannot be reached to
    /// revoke the token.
    pub async fn logout(&self) {
        let mut previous = None;
        self.state.send_if_modified(|state| {
            let Some(session) = state.active.take() else {
                return false;
            };
            state.generation += 1;
            // Published under the watch lock so event order matches state order.
            self.bus.publish(
                AppEvent::new(EventKind::SessionChanged { identity: None })
                    .with_actor(session.identity.uid.clone()),
            );
            previous = Some(session);
            true
        });

        let Some(previous) = previous else {
            tracing::debug!("Logout requested while signed out");
            return;
        };

        tracing::info!(uid = %previous.identity.uid, "Signed out");
        self.revoke(&previous).await;
    }

    async fn establish(&self, session: AuthSession) -> Identity {
        let identity = session.identity.clone();
        let token = session.token.clone();

        let mut replaced = None;
        self.state.send_modify(|state| {
            replaced = state.active.replace(session);
            state.generation += 1;
            self.bus.publish(
                AppEvent::new(EventKind::SessionChanged {
                    identity: Some(identity.clone()),
                })
                .with_actor(identity.uid.clone()),
            );
        });

        tracing::info!(uid = %identity.uid, "Signed in");

        // Restoring the active token replaces the session with itself.
        if let Some(replaced) = replaced.filter(|r| r.token != token) {
            self.revoke(&replaced).await;
        }
        identity
    }

    async fn revoke(&self, session: &AuthSession) {
        if let Err(e) = self.auth.sign_out(&session.token).await {
            tracing::warn!(
                error = %e,
                uid = %session.identity.uid,
                "Failed to revoke session token at the provider"
            );
        }
    }
}

/// Receives session transitions published after it was created.
pub struct SessionWatcher {
    receiver: broadcast::Receiver<AppEvent>,
}

impl SessionWatcher {
    /// Wait for the next transition. `None` once the bus has closed.
    pub async fn changed(&mut self) -> Option<Option<Identity>> {
        loop {
            match self.receiver.recv().await {
                Ok(AppEvent {
                    kind: EventKind::SessionChanged { identity },
                    ..
                }) => return Some(identity),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Session watcher lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant of [`changed`](Self::changed): the next queued
    /// transition, if any.
    pub fn try_changed(&mut self) -> Option<Option<Identity>> {
        loop {
            match self.receiver.try_recv() {
                Ok(AppEvent {
                    kind: EventKind::SessionChanged { identity },
                    ..
                }) => return Some(identity),
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Session watcher lagged");
                }
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use fittrack_backend::InMemoryAuthProvider;

    use super::*;

    async fn store_with_account() -> (SessionStore, Arc<InMemoryAuthProvider>) {
        let auth = Arc::new(InMemoryAuthProvider::default());
        let store = SessionStore::new(auth.clone(), Arc::new(EventBus::default()));
        store
            .register("a@x.com", "secret1")
            .await
            .expect("registration should succeed");
        (store, auth)
    }

    #[tokio::test]
    async fn starts_signed_out() {
        let auth = Arc::new(InMemoryAuthProvider::default());
        let store = SessionStore::new(auth, Arc::new(EventBus::default()));
        assert!(store.current().is_none());
        assert!(store.token().is_none());
        assert_eq!(store.generation(), 0);
    }

    #[tokio::test]
    async fn register_does_not_sign_in() {
        let (store, _auth) = store_with_account().await;
        assert!(!store.is_signed_in());
        assert_eq!(store.generation(), 0);
    }

    #[tokio::test]
    async fn login_notifies_before_returning() {
        let (store, _auth) = store_with_account().await;
        let mut watcher = store.subscribe();

        let identity = store.login("a@x.com", "secret1").await.expect("login should succeed");

        assert_eq!(watcher.try_changed(), Some(Some(identity.clone())));
        assert_eq!(store.current(), Some(identity));
        assert_eq!(store.generation(), 1);
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_fail_alike() {
        let (store, _auth) = store_with_account().await;
        let unknown = store.login("nobody@x.com", "secret1").await;
        let wrong = store.login("a@x.com", "bad-password").await;
        assert_matches!(unknown, Err(CoreError::Auth(AuthError::InvalidCredential)));
        assert_matches!(wrong, Err(CoreError::Auth(AuthError::InvalidCredential)));
        assert!(!store.is_signed_in());
    }

    #[tokio::test]
    async fn logout_is_idempotent_and_notifies_once() {
        let (store, auth) = store_with_account().await;
        store.login("a@x.com", "secret1").await.unwrap();
        let mut watcher = store.subscribe();

        store.logout().await;
        store.logout().await;

        assert_eq!(watcher.try_changed(), Some(None));
        assert_eq!(watcher.try_changed(), None);
        assert!(store.current().is_none());
        assert_eq!(store.generation(), 2);
        assert_eq!(auth.live_session_count().await, 0);
    }

    #[tokio::test]
    async fn logout_clears_locally_when_provider_is_offline() {
        let (store, auth) = store_with_account().await;
        store.login("a@x.com", "secret1").await.unwrap();

        auth.set_online(false);
        store.logout().await;
        assert!(!store.is_signed_in());
    }

    #[tokio::test]
    async fn restore_resumes_a_saved_token() {
        let (store, auth) = store_with_account().await;
        let identity = store.login("a@x.com", "secret1").await.unwrap();
        let token = store.token().expect("signed-in store exposes its token");

        // A fresh process sharing the same provider.
        let restarted = SessionStore::new(auth, Arc::new(EventBus::default()));
        assert!(!restarted.is_signed_in());
        let restored = restarted.restore(&token).await.expect("restore should succeed");
        assert_eq!(restored, identity);
        assert!(restarted.is_signed_in());
    }

    #[tokio::test]
    async fn restore_with_revoked_token_stays_signed_out() {
        let (store, _auth) = store_with_account().await;
        store.login("a@x.com", "secret1").await.unwrap();
        let token = store.token().unwrap();
        store.logout().await;

        let result = store.restore(&token).await;
        assert_matches!(result, Err(CoreError::Auth(AuthError::InvalidToken)));
        assert!(!store.is_signed_in());
    }

    #[tokio::test]
    async fn second_login_revokes_the_replaced_token() {
        let (store, auth) = store_with_account().await;
        store.login("a@x.com", "secret1").await.unwrap();
        store.login("a@x.com", "secret1").await.unwrap();
        assert_eq!(auth.live_session_count().await, 1);
        assert_eq!(store.generation(), 2);
    }

    #[tokio::test]
    async fn outage_is_not_reported_as_bad_credentials() {
        let (store, auth) = store_with_account().await;
        auth.set_online(false);
        let result = store.login("a@x.com", "secret1").await;
        assert_matches!(result, Err(CoreError::Auth(AuthError::Unavailable(_))));
    }

    #[tokio::test]
    async fn restoring_the_active_token_keeps_it_alive() {
        let (store, auth) = store_with_account().await;
        store.login("a@x.com", "secret1").await.unwrap();
        let token = store.token().unwrap();

        store.restore(&token).await.expect("restore should succeed");
        assert_eq!(auth.live_session_count().await, 1);
        assert_eq!(store.token(), Some(token.clone()));

        // Still valid at the provider, so it can be restored again.
        store.restore(&token).await.expect("second restore should succeed");
        assert_eq!(auth.live_session_count().await, 1);
    }

    #[tokio::test]
    async fn failed_restore_keeps_the_current_session() {
        let (store, _auth) = store_with_account().await;
        let identity = store.login("a@x.com", "secret1").await.unwrap();

        let result = store.restore("not-a-token").await;
        assert_matches!(result, Err(CoreError::Auth(AuthError::InvalidToken)));
        assert_eq!(store.current(), Some(identity));
    }

    #[tokio::test]
    async fn transition_events_match_final_state_under_contention() {
        let (store, _auth) = store_with_account().await;
        let store = Arc::new(store);
        let mut watcher = store.subscribe();

        let mut tasks = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    let _ = store.login("a@x.com", "secret1").await;
                } else {
                    store.logout().await;
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let mut last = None;
        while let Some(change) = watcher.try_changed() {
            last = Some(change);
        }
        let last = last.expect("at least one transition");
        assert_eq!(last.is_some(), store.is_signed_in());
    }
}
