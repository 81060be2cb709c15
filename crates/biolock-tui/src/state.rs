//! TUI state.
//!
//! Wraps the core [`AppState`] with presentation-only data: which control
//! has keyboard focus, the spinner frame, and whether the user asked to quit.

use biolock_core::credentials::CredentialField;
use biolock_core::events::{Event, Form};
use biolock_core::state::{AppState, Screen};

/// Focusable controls, in tab order per screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    LoginEmail,
    LoginPassword,
    LoginButton,
    UseBioLogin,
    BiometricLogin,
    UsePasswordLogin,
    BiometricSwitch,
    Logout,
    ModalEmail,
    ModalPassword,
    SaveLogin,
    Close,
}

impl Control {
    /// The text field this control edits, if any.
    pub fn field(self) -> Option<(Form, CredentialField)> {
        match self {
            Control::LoginEmail => Some((Form::Login, CredentialField::Email)),
            Control::LoginPassword => Some((Form::Login, CredentialField::Password)),
            Control::ModalEmail => Some((Form::Modal, CredentialField::Email)),
            Control::ModalPassword => Some((Form::Modal, CredentialField::Password)),
            _ => None,
        }
    }

    /// Core event produced when the control is activated.
    ///
    /// Enter inside a text field submits the form it belongs to.
    pub fn activate(self) -> Event {
        match self {
            Control::LoginEmail
            | Control::LoginPassword
            | Control::LoginButton
            | Control::BiometricLogin => Event::SubmitLogin,
            Control::UseBioLogin => Event::UseBioLogin,
            Control::UsePasswordLogin => Event::UsePasswordLogin,
            Control::BiometricSwitch => Event::ToggleBiometrics,
            Control::Logout => Event::Logout,
            Control::ModalEmail | Control::ModalPassword | Control::SaveLogin => Event::SaveModal,
            Control::Close => Event::CloseModal,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Control::LoginEmail | Control::ModalEmail => "Email",
            Control::LoginPassword | Control::ModalPassword => "Password",
            Control::LoginButton => "Login",
            Control::UseBioLogin => "Use Bio Login",
            Control::BiometricLogin => "Biometric Login",
            Control::UsePasswordLogin => "Use Password Login",
            Control::BiometricSwitch => "Enable Biometric Login",
            Control::Logout => "Log out",
            Control::SaveLogin => "Save Login",
            Control::Close => "Close",
        }
    }
}

/// Controls shown on the current screen, in tab order.
pub fn controls(app: &AppState) -> Vec<Control> {
    match app.screen() {
        Screen::LoginForm => {
            let mut controls = vec![
                Control::LoginEmail,
                Control::LoginPassword,
                Control::LoginButton,
            ];
            if app.biometrics.enabled {
                controls.push(Control::UseBioLogin);
            }
            controls
        }
        Screen::BiometricForm => vec![Control::BiometricLogin, Control::UsePasswordLogin],
        Screen::Settings => vec![Control::BiometricSwitch, Control::Logout],
        Screen::SettingsModal => vec![
            Control::ModalEmail,
            Control::ModalPassword,
            Control::SaveLogin,
            Control::Close,
        ],
    }
}

#[derive(Debug, Clone)]
pub struct TuiState {
    pub app: AppState,
    /// Index into [`controls`] for the current screen.
    pub focus: usize,
    /// Screen the focus index refers to.
    focus_screen: Screen,
    pub dev_mode: bool,
    pub spinner_frame: usize,
    pub should_quit: bool,
}

impl TuiState {
    pub fn new(dev_mode: bool) -> Self {
        let app = AppState::new();
        let focus_screen = app.screen();
        Self {
            app,
            focus: 0,
            focus_screen,
            dev_mode,
            spinner_frame: 0,
            should_quit: false,
        }
    }

    pub fn focused(&self) -> Option<Control> {
        controls(&self.app).get(self.focus).copied()
    }

    pub fn is_focused(&self, control: Control) -> bool {
        self.focused() == Some(control)
    }

    /// Whether the spinner is on screen: an adapter call is in flight or
    /// the secure store has not been read yet.
    pub fn is_waiting(&self) -> bool {
        self.app.is_busy() || !self.app.loaded
    }

    /// Whether a text field has focus (printable keys edit it).
    pub fn is_editing(&self) -> bool {
        self.app.notice.is_none() && self.focused().and_then(Control::field).is_some()
    }

    pub fn focus_next(&mut self) {
        let count = controls(&self.app).len();
        if count > 0 {
            self.focus = (self.focus + 1) % count;
        }
    }

    pub fn focus_prev(&mut self) {
        let count = controls(&self.app).len();
        if count > 0 {
            self.focus = (self.focus + count - 1) % count;
        }
    }

    /// Resets focus after a screen change and clamps it when controls
    /// disappear.
    pub fn sync_focus(&mut self) {
        let screen = self.app.screen();
        if screen != self.focus_screen {
            self.focus_screen = screen;
            self.focus = 0;
        }
        let count = controls(&self.app).len();
        if self.focus >= count {
            self.focus = count.saturating_sub(1);
        }
    }
}
