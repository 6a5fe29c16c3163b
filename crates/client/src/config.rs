use fittrack_core::config::{env_or, env_string_or, ConfigError};
use fittrack_core::validation::DEFAULT_MIN_PASSWORD_LENGTH;
use fittrack_events::bus::DEFAULT_CAPACITY;

/// Collection holding workout documents.
pub const DEFAULT_WORKOUTS_COLLECTION: &str = "tasks";

/// Client configuration loaded from environment variables.
///
/// All fields have defaults matching the production backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Name of the document collection that holds workouts.
    pub workouts_collection: String,
    /// Minimum password length enforced by the registration form.
    pub min_password_length: usize,
    /// Buffer capacity of the event bus.
    pub event_capacity: usize,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default |
    /// |--------------------------------|---------|
    /// | `FITTRACK_WORKOUTS_COLLECTION` | `tasks` |
    /// | `FITTRACK_MIN_PASSWORD_LEN`    | `6`     |
    /// | `FITTRACK_EVENT_CAPACITY`      | `1024`  |
    pub fn from_env() -> Result<Self, ConfigError> {
        let workouts_collection =
            env_string_or("FITTRACK_WORKOUTS_COLLECTION", DEFAULT_WORKOUTS_COLLECTION);

        let min_password_length: usize = env_or(
            "FITTRACK_MIN_PASSWORD_LEN",
            DEFAULT_MIN_PASSWORD_LENGTH,
            "a positive integer",
        )?;

        let event_capacity: usize =
            env_or("FITTRACK_EVENT_CAPACITY", DEFAULT_CAPACITY, "a positive integer")?;

        Ok(Self {
            workouts_collection,
            min_password_length,
            event_capacity,
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            workouts_collection: DEFAULT_WORKOUTS_COLLECTION.to_string(),
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
            event_capacity: DEFAULT_CAPACITY,
        }
    }
}
