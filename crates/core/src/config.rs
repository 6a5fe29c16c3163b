//! Helpers shared by the environment-driven configuration types.

use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Read `var` from the environment, falling back to `default` when unset.
///
/// A value that is set but does not parse is an error rather than silently
/// replaced by the default.
pub fn env_or<T: FromStr>(
    var: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            var,
            expected,
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

/// Read a string variable, treating an empty value as unset.
pub fn env_string_or(var: &'static str, default: &str) -> String {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_variable_uses_default() {
        let value: usize = env_or("FITTRACK_TEST_SURELY_UNSET_VAR", 6, "a positive integer")
            .expect("default should be returned");
        assert_eq!(value, 6);
        assert_eq!(env_string_or("FITTRACK_TEST_SURELY_UNSET_VAR", "tasks"), "tasks");
    }

    #[test]
    fn invalid_display_names_the_variable() {
        let err = ConfigError::Invalid {
            var: "FITTRACK_MIN_PASSWORD_LEN",
            expected: "a positive integer",
            value: "six".into(),
        };
        assert_eq!(
            err.to_string(),
            "FITTRACK_MIN_PASSWORD_LEN must be a positive integer, got \"six\""
        );
    }
}
