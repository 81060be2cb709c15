//! View-model for the login screen.
//!
//! ```text
//! AppState
//! ├── login: Credentials        (login form input)
//! ├── modal: Credentials        (settings modal input)
//! ├── cached: Credentials       (copy of the secure store)
//! ├── biometrics: BiometricState
//! ├── session: SessionState     (logged in, error, modal open)
//! ├── notice: Option<Notice>    (blocking alert)
//! └── pending: Option<Pending>  (adapter operation in flight)
//! ```
//!
//! The visible [`Screen`] is derived, never stored.

use serde::{Deserialize, Serialize};

use crate::credentials::Credentials;

/// Screens of the login flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    LoginForm,
    BiometricForm,
    Settings,
    SettingsModal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiometricState {
    /// Device has enrolled biometric records (as of the last query).
    pub records: bool,
    /// User opted in; backed by the secure store.
    pub enabled: bool,
    /// Biometric login form is shown instead of the password form.
    pub show_bio_login: bool,
}

impl BiometricState {
    /// Sets the opt-in flag; the form variant follows it.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.show_bio_login = enabled;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub logged_in: bool,
    pub error: Option<String>,
    pub modal_visible: bool,
}

/// Blocking notice with a single acknowledge button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub message: String,
    pub button: String,
}

impl Notice {
    pub fn new(title: &str, message: &str) -> Self {
        Self {
            title: title.to_string(),
            message: message.to_string(),
            button: "OK".to_string(),
        }
    }

    /// Shown when a biometric login is attempted without enrollment.
    pub fn no_records_for_login() -> Self {
        Self::new(
            "No biometric records found",
            "Please login with your password instead",
        )
    }

    /// Shown when enabling biometrics without enrollment.
    pub fn no_records_for_settings() -> Self {
        Self::new(
            "No biometric records found",
            "Please enable them on the device before enabling biometrics here",
        )
    }
}

/// Why enrollment is being queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnrollmentPurpose {
    Mount,
    Login,
}

/// Adapter operation started by a user action and not yet resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pending {
    EnrollmentCheck,
    Authenticating,
    Saving,
    Clearing,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    pub login: Credentials,
    pub modal: Credentials,
    pub cached: Credentials,
    pub biometrics: BiometricState,
    pub session: SessionState,
    pub notice: Option<Notice>,
    pub pending: Option<Pending>,
    /// The mount-time store read has completed (successfully or not).
    pub loaded: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen(&self) -> Screen {
        match (self.session.logged_in, self.session.modal_visible) {
            (true, true) => Screen::SettingsModal,
            (true, false) => Screen::Settings,
            (false, _) if self.biometrics.show_bio_login => Screen::BiometricForm,
            (false, _) => Screen::LoginForm,
        }
    }

    pub fn title(&self) -> &'static str {
        if self.session.logged_in {
            "Edit Saved Credentials"
        } else {
            "Login Page"
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.session.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_screen_is_login_form() {
        let state = AppState::new();
        assert_eq!(state.screen(), Screen::LoginForm);
        assert_eq!(state.title(), "Login Page");
    }

    #[test]
    fn test_screen_is_derived_from_flags() {
        let mut state = AppState::new();
        state.biometrics.set_enabled(true);
        assert_eq!(state.screen(), Screen::BiometricForm);

        state.session.logged_in = true;
        assert_eq!(state.screen(), Screen::Settings);
        assert_eq!(state.title(), "Edit Saved Credentials");

        state.session.modal_visible = true;
        assert_eq!(state.screen(), Screen::SettingsModal);
    }

    #[test]
    fn test_state_serializes_to_json() {
        let mut state = AppState::new();
        state.login.email.push_str("test");
        state.notice = Some(Notice::no_records_for_login());

        let json = serde_json::to_string(&state).unwrap();
        let back: AppState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
