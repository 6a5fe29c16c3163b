//! Error taxonomy shared by the auth provider, the document store and the
//! client core.
//!
//! Remote failures are classified into tagged variants at the collaborator
//! boundary. Screens never compare strings or codes; they call
//! [`CoreError::user_message`] to get the notice text.

/// Message shown for any failure caused by the network or the provider being down.
const NETWORK_MESSAGE: &str = "Network error. Please try again.";

/// Failures reported by the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("An account already exists for this email")]
    EmailAlreadyInUse,

    #[error("Malformed email address")]
    InvalidEmail,

    #[error("Password must be at least {min_length} characters long")]
    WeakPassword { min_length: usize },

    /// Unknown user and wrong password are deliberately indistinguishable.
    #[error("Invalid credentials")]
    InvalidCredential,

    #[error("Session token is invalid or expired")]
    InvalidToken,

    #[error("Auth provider unavailable: {0}")]
    Unavailable(String),
}

impl AuthError {
    /// Text suitable for a user-facing notice.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::EmailAlreadyInUse => "An account with this email already exists.",
            Self::InvalidEmail => "Please enter a valid email address.",
            Self::WeakPassword { .. } => {
                "Password is too weak. Please choose a stronger password."
            }
            Self::InvalidCredential => "Invalid credentials. Please try again.",
            Self::InvalidToken => "Your session has expired. Please sign in again.",
            Self::Unavailable(_) => NETWORK_MESSAGE,
        }
    }
}

/// Failures reported by the document store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Document store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Text suitable for a user-facing notice.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "That workout no longer exists.",
            Self::InvalidInput(_) => "Something went wrong. Please try again.",
            Self::Unavailable(_) => NETWORK_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Rejected locally, before any network call.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Text suitable for a user-facing notice.
    ///
    /// Validation messages are already written for the user and pass through
    /// unchanged.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::Auth(e) => e.user_message().to_string(),
            Self::Store(e) => e.user_message().to_string(),
            Self::Internal(_) => "Something went wrong. Please try again.".to_string(),
        }
    }

    /// Returns `true` when the failure was raised before reaching a provider.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
