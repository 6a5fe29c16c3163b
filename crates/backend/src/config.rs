use fittrack_core::config::{env_or, env_string_or, ConfigError};
use fittrack_core::validation::DEFAULT_MIN_PASSWORD_LENGTH;

use crate::auth::token::TokenConfig;

/// Secret used when `FITTRACK_TOKEN_SECRET` is not set. Development only.
const DEV_TOKEN_SECRET: &str = "fittrack-dev-secret-change-me";

/// Default session lifetime: seven days.
const DEFAULT_SESSION_TTL_MINS: i64 = 7 * 24 * 60;

/// Configuration of the in-memory providers.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Session-token signing and lifetime.
    pub token: TokenConfig,
    /// Passwords shorter than this are rejected as weak on account creation.
    pub min_password_length: usize,
}

impl BackendConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default             |
    /// |-----------------------------|---------------------|
    /// | `FITTRACK_TOKEN_SECRET`     | development secret  |
    /// | `FITTRACK_SESSION_TTL_MINS` | `10080`             |
    /// | `FITTRACK_MIN_PASSWORD_LEN` | `6`                 |
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = env_string_or("FITTRACK_TOKEN_SECRET", DEV_TOKEN_SECRET);
        if secret == DEV_TOKEN_SECRET {
            tracing::warn!("FITTRACK_TOKEN_SECRET not set, using the development secret");
        }

        let ttl_mins: i64 = env_or(
            "FITTRACK_SESSION_TTL_MINS",
            DEFAULT_SESSION_TTL_MINS,
            "a number of minutes",
        )?;

        let min_password_length: usize = env_or(
            "FITTRACK_MIN_PASSWORD_LEN",
            DEFAULT_MIN_PASSWORD_LENGTH,
            "a positive integer",
        )?;

        Ok(Self {
            token: TokenConfig { secret, ttl_mins },
            min_password_length,
        })
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            token: TokenConfig {
                secret: DEV_TOKEN_SECRET.to_string(),
                ttl_mins: DEFAULT_SESSION_TTL_MINS,
            },
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
        }
    }
}
