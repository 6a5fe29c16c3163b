//! The authenticated user handle.

use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// Greeting used when the user never set a display name.
pub const DEFAULT_GREETING_NAME: &str = "Gym Enthusiast";

/// Opaque user handle owned by the session store.
///
/// Created on successful registration or sign-in and dropped on sign-out.
/// Consumers only ever read it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: UserId,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

impl Identity {
    pub fn new(uid: impl Into<UserId>) -> Self {
        Self {
            uid: uid.into(),
            display_name: None,
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Name shown on the home screen greeting.
    pub fn greeting_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(DEFAULT_GREETING_NAME)
    }
}
