//! Client-side checks run before any remote call.
//!
//! Each check returns [`CoreError::Validation`] carrying the exact text shown
//! to the user, so screens can surface it without further mapping. Checks run
//! in form order and stop at the first failure.

use validator::ValidateEmail;

use crate::error::CoreError;

/// Minimum password length accepted by the registration form.
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 6;

fn invalid(msg: impl Into<String>) -> CoreError {
    CoreError::Validation(msg.into())
}

/// A workout title must contain something other than whitespace.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(invalid("Title is required"));
    }
    Ok(())
}

/// Check the shape of an email address (presence is checked separately).
pub fn validate_email_format(email: &str) -> Result<(), CoreError> {
    if !email.trim().validate_email() {
        return Err(invalid("Please enter a valid email address"));
    }
    Ok(())
}

/// Validate that a password meets the minimum length policy.
pub fn validate_password_strength(password: &str, min_length: usize) -> Result<(), CoreError> {
    if password.chars().count() < min_length {
        return Err(invalid(format!(
            "Password must be at least {min_length} characters long"
        )));
    }
    Ok(())
}

/// Both login fields are required. The email shape is left to the provider,
/// whose failure is the generic credential error.
pub fn validate_login(email: &str, password: &str) -> Result<(), CoreError> {
    if email.trim().is_empty() || password.trim().is_empty() {
        return Err(invalid("Please fill in all fields"));
    }
    Ok(())
}

/// Registration form checks, in the order the form presents its fields.
pub fn validate_registration(
    full_name: &str,
    email: &str,
    password: &str,
    confirm_password: &str,
    min_password_length: usize,
) -> Result<(), CoreError> {
    if full_name.trim().is_empty() {
        return Err(invalid("Please enter your full name"));
    }
    if email.trim().is_empty() {
        return Err(invalid("Please enter your email address"));
    }
    validate_email_format(email)?;
    if password.trim().is_empty() {
        return Err(invalid("Please enter a password"));
    }
    validate_password_strength(password, min_password_length)?;
    if password != confirm_password {
        return Err(invalid("Passwords do not match"));
    }
    Ok(())
}

/// A record id must be non-empty before it is sent anywhere.
pub fn validate_record_id(id: &str) -> Result<(), CoreError> {
    if id.trim().is_empty() {
        return Err(CoreError::Store(crate::error::StoreError::InvalidInput(
            "Workout id is required".into(),
        )));
    }
    Ok(())
}
