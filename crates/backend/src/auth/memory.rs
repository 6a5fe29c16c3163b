//! In-process [`AuthProvider`].
//!
//! Accounts are keyed by normalized (trimmed, lower-cased) email. Passwords
//! are stored as Argon2id hashes; sessions as token digests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use fittrack_core::types::UserId;
use fittrack_core::{AuthError, Identity};
use tokio::sync::RwLock;
use uuid::Uuid;
use validator::ValidateEmail;

use super::password::{hash_password, verify_password};
use super::token::{issue_token, token_digest, validate_token};
use super::{AuthProvider, AuthSession};
use crate::config::BackendConfig;

struct Account {
    uid: UserId,
    email: String,
    display_name: Option<String>,
    password_hash: String,
}

impl Account {
    fn identity(&self) -> Identity {
        Identity {
            uid: self.uid.clone(),
            display_name: self.display_name.clone(),
            email: Some(self.email.clone()),
        }
    }
}

pub struct InMemoryAuthProvider {
    config: BackendConfig,
    /// Accounts indexed by normalized email.
    accounts: RwLock<HashMap<String, Account>>,
    /// Live session token digests mapped to their user.
    sessions: RwLock<HashMap<String, UserId>>,
    online: AtomicBool,
}

impl InMemoryAuthProvider {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            config,
            accounts: RwLock::new(HashMap::new()),
            sessions: RwLock::new(HashMap::new()),
            online: AtomicBool::new(true),
        }
    }

    /// Simulate losing (or regaining) the connection to the provider.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Number of sessions that have not been revoked.
    pub async fn live_session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn ensure_online(&self) -> Result<(), AuthError> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AuthError::Unavailable("auth provider is offline".into()))
        }
    }

    async fn open_session(&self, account: &Account) -> Result<AuthSession, AuthError> {
        let token = issue_token(&account.uid, Some(&account.email), &self.config.token)
            .map_err(|e| AuthError::Unavailable(format!("token issue failed: {e}")))?;
        self.sessions
            .write()
            .await
            .insert(token_digest(&token), account.uid.clone());
        Ok(AuthSession {
            identity: account.identity(),
            token,
        })
    }
}

impl Default for InMemoryAuthProvider {
    fn default() -> Self {
        Self::new(BackendConfig::default())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl AuthProvider for InMemoryAuthProvider {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<Identity, AuthError> {
        self.ensure_online()?;

        let email = normalize_email(email);
        if !email.validate_email() {
            return Err(AuthError::InvalidEmail);
        }
        let min_length = self.config.min_password_length;
        if password.chars().count() < min_length {
            return Err(AuthError::WeakPassword { min_length });
        }
        if self.accounts.read().await.contains_key(&email) {
            return Err(AuthError::EmailAlreadyInUse);
        }

        let password_hash = hash_password(password)?;

        let mut accounts = self.accounts.write().await;
        // Re-check under the write lock: another registration may have won.
        if accounts.contains_key(&email) {
            return Err(AuthError::EmailAlreadyInUse);
        }
        let account = Account {
            uid: Uuid::now_v7().simple().to_string(),
            email: email.clone(),
            display_name: display_name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            password_hash,
        };
        let identity = account.identity();
        accounts.insert(email, account);

        tracing::debug!(uid = %identity.uid, "Account created");
        Ok(identity)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        self.ensure_online()?;

        let accounts = self.accounts.read().await;
        let account = accounts
            .get(&normalize_email(email))
            .ok_or(AuthError::InvalidCredential)?;

        let valid = verify_password(password, &account.password_hash)?;
        if !valid {
            return Err(AuthError::InvalidCredential);
        }

        self.open_session(account).await
    }

    async fn sign_out(&self, token: &str) -> Result<(), AuthError> {
        self.ensure_online()?;
        self.sessions.write().await.remove(&token_digest(token));
        Ok(())
    }

    async fn resume(&self, token: &str) -> Result<AuthSession, AuthError> {
        self.ensure_online()?;

        let claims =
            validate_token(token, &self.config.token).map_err(|_| AuthError::InvalidToken)?;

        let live_uid = self.sessions.read().await.get(&token_digest(token)).cloned();
        if live_uid.as_deref() != Some(claims.sub.as_str()) {
            return Err(AuthError::InvalidToken);
        }

        let accounts = self.accounts.read().await;
        let account = accounts
            .values()
            .find(|a| a.uid == claims.sub)
            .ok_or(AuthError::InvalidToken)?;

        Ok(AuthSession {
            identity: account.identity(),
            token: token.to_string(),
        })
    }
}
