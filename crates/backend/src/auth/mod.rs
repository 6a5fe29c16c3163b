//! Authentication provider interface.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`token`] -- HS256 session tokens.
//! - [`memory`] -- in-process provider built on the two above.

pub mod memory;
pub mod password;
pub mod token;

use async_trait::async_trait;
use fittrack_core::{AuthError, Identity};

/// A signed-in identity together with the opaque token that resumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub identity: Identity,
    pub token: String,
}

/// Email/password account provider.
///
/// Implementations classify every failure into an [`AuthError`] variant;
/// callers never inspect provider-specific codes.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Create an account. Does not sign the new user in.
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<Identity, AuthError>;

    /// Authenticate. Unknown email and wrong password both yield
    /// [`AuthError::InvalidCredential`].
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    /// Revoke a session token. Revoking an unknown token is not an error.
    async fn sign_out(&self, token: &str) -> Result<(), AuthError>;

    /// Resume a session from a previously issued token.
    async fn resume(&self, token: &str) -> Result<AuthSession, AuthError>;
}
