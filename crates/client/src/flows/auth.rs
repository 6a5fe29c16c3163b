//! Login, registration and sign-out.

use fittrack_core::validation::{validate_login, validate_registration};
use fittrack_core::{CoreError, Identity};
use fittrack_events::Notice;

use super::report_failure;
use crate::gate::Route;
use crate::state::AppState;

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Sign in. On success the gate moves to the dashboard by itself.
    pub async fn submit(&self, state: &AppState) -> Result<Identity, CoreError> {
        if let Err(e) = validate_login(&self.email, &self.password) {
            report_failure(state, "Validation Error", "login", &e);
            return Err(e);
        }

        let result = {
            let _busy = state.busy.acquire("login");
            state.session.login(self.email.trim(), &self.password).await
        };

        match result {
            Ok(identity) => {
                state.notify(Notice::success("Success", "Login successful!"));
                Ok(identity)
            }
            Err(e) => {
                report_failure(state, "Login Failed", "login", &e);
                Err(e)
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    /// Create the account, then return to the login screen. The new account
    /// is not signed in.
    pub async fn submit(&self, state: &AppState) -> Result<Identity, CoreError> {
        if let Err(e) = validate_registration(
            &self.full_name,
            &self.email,
            &self.password,
            &self.confirm_password,
            state.config.min_password_length,
        ) {
            report_failure(state, "Validation Error", "register", &e);
            return Err(e);
        }

        let result = {
            let _busy = state.busy.acquire("register");
            state
                .session
                .register_with_profile(self.email.trim(), &self.password, Some(self.full_name.trim()))
                .await
        };

        match result {
            Ok(identity) => {
                state.notify(Notice::success(
                    "Success",
                    "Registration successful! Please sign in to continue.",
                ));
                if state.gate.current() == Route::Register {
                    state.gate.back();
                }
                if state.gate.current() != Route::Login {
                    state.gate.navigate(Route::Login);
                }
                Ok(identity)
            }
            Err(e) => {
                report_failure(state, "Registration Failed", "register", &e);
                Err(e)
            }
        }
    }
}

/// Sign out from the settings screen. The gate lands on the login screen.
pub async fn sign_out(state: &AppState) {
    let _busy = state.busy.acquire("sign out");
    state.session.logout().await;
}
