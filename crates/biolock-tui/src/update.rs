//! TUI reducer.
//!
//! Translates terminal input into core events and forwards them to the core
//! reducer. Returns the effects the runtime must execute.

use biolock_core::effects::Effect;
use biolock_core::events::{Event, TextEdit};
use biolock_core::update as reducer;
use biolock_core::verify::CredentialVerifier;
use crossterm::event::{Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::events::UiEvent;
use crate::state::TuiState;

pub fn update(
    state: &mut TuiState,
    event: UiEvent,
    verifier: &dyn CredentialVerifier,
) -> Vec<Effect> {
    match event {
        UiEvent::Tick => {
            if state.is_waiting() {
                state.spinner_frame = state.spinner_frame.wrapping_add(1);
            }
            vec![]
        }
        UiEvent::Core(event) => dispatch(state, event, verifier),
        UiEvent::Terminal(TermEvent::Key(key)) => match handle_key(state, key) {
            Some(event) => dispatch(state, event, verifier),
            None => vec![],
        },
        UiEvent::Terminal(TermEvent::Paste(text)) => match paste(state, text) {
            Some(event) => dispatch(state, event, verifier),
            None => vec![],
        },
        UiEvent::Terminal(_) => vec![],
    }
}

fn dispatch(state: &mut TuiState, event: Event, verifier: &dyn CredentialVerifier) -> Vec<Effect> {
    let effects = reducer::update(&mut state.app, event, verifier);
    state.sync_focus();
    effects
}

/// Maps a key press to a core event. Focus movement and quitting are
/// handled here and yield `None`.
fn handle_key(state: &mut TuiState, key: KeyEvent) -> Option<Event> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return None;
    }

    if state.app.notice.is_some() {
        return matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' '))
            .then_some(Event::DismissNotice);
    }

    let focused = state.focused()?;
    let field = focused.field();

    match key.code {
        KeyCode::Tab | KeyCode::Down => {
            state.focus_next();
            None
        }
        KeyCode::BackTab | KeyCode::Up => {
            state.focus_prev();
            None
        }
        KeyCode::Esc if state.app.session.modal_visible => Some(Event::CloseModal),
        KeyCode::Enter => Some(focused.activate()),
        KeyCode::Backspace => field.map(|(form, field)| Event::Edit {
            form,
            field,
            edit: TextEdit::Backspace,
        }),
        KeyCode::Char('u') if ctrl => field.map(|(form, field)| Event::Edit {
            form,
            field,
            edit: TextEdit::Clear,
        }),
        KeyCode::Char(ch) if !ctrl => match field {
            Some((form, field)) => Some(Event::Edit {
                form,
                field,
                edit: TextEdit::Insert(ch),
            }),
            None if ch == ' ' => Some(focused.activate()),
            None if ch == 'q' => {
                state.should_quit = true;
                None
            }
            None => None,
        },
        _ => None,
    }
}

fn paste(state: &TuiState, text: String) -> Option<Event> {
    if state.app.notice.is_some() {
        return None;
    }
    let (form, field) = state.focused()?.field()?;
    let text: String = text.chars().filter(|ch| !ch.is_control()).collect();
    Some(Event::Edit {
        form,
        field,
        edit: TextEdit::InsertStr(text),
    })
}

#[cfg(test)]
mod tests {
    use biolock_core::credentials::Credentials;
    use biolock_core::state::{EnrollmentPurpose, Notice, Pending, Screen};
    use biolock_core::store::StoreSnapshot;
    use biolock_core::verify::FixedVerifier;
    use crossterm::event::KeyEventState;

    use super::*;
    use crate::state::Control;

    fn key(code: KeyCode) -> UiEvent {
        UiEvent::Terminal(TermEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn ctrl(ch: char) -> UiEvent {
        UiEvent::Terminal(TermEvent::Key(KeyEvent::new(
            KeyCode::Char(ch),
            KeyModifiers::CONTROL,
        )))
    }

    fn type_text(state: &mut TuiState, text: &str) {
        for ch in text.chars() {
            update(state, key(KeyCode::Char(ch)), &FixedVerifier::default());
        }
    }

    fn press(state: &mut TuiState, code: KeyCode) -> Vec<Effect> {
        update(state, key(code), &FixedVerifier::default())
    }

    /// Login screen after the secure store read came back empty.
    fn ready() -> TuiState {
        let mut state = TuiState::new(false);
        state.app.loaded = true;
        state
    }

    fn logged_in() -> TuiState {
        let mut state = ready();
        type_text(&mut state, "test");
        press(&mut state, KeyCode::Tab);
        type_text(&mut state, "123");
        press(&mut state, KeyCode::Enter);
        state
    }

    #[test]
    fn test_typing_edits_focused_field() {
        let mut state = TuiState::new(false);
        type_text(&mut state, "tesx");
        press(&mut state, KeyCode::Backspace);
        type_text(&mut state, "t");
        press(&mut state, KeyCode::Tab);
        type_text(&mut state, "12");

        assert_eq!(state.app.login, Credentials::new("test", "12"));
    }

    #[test]
    fn test_q_types_into_field_but_quits_on_button() {
        let mut state = TuiState::new(false);
        type_text(&mut state, "q");
        assert!(!state.should_quit);
        assert_eq!(state.app.login.email, "q");

        press(&mut state, KeyCode::Tab);
        press(&mut state, KeyCode::Tab);
        assert_eq!(state.focused(), Some(Control::LoginButton));
        type_text(&mut state, "q");
        assert!(state.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits_anywhere() {
        let mut state = TuiState::new(false);
        update(&mut state, ctrl('c'), &FixedVerifier::default());
        assert!(state.should_quit);
    }

    #[test]
    fn test_ctrl_u_clears_field() {
        let mut state = TuiState::new(false);
        type_text(&mut state, "someone");
        update(&mut state, ctrl('u'), &FixedVerifier::default());
        assert!(state.app.login.email.is_empty());
    }

    #[test]
    fn test_enter_in_password_field_submits() {
        let state = logged_in();
        assert_eq!(state.app.screen(), Screen::Settings);
        assert_eq!(state.focused(), Some(Control::BiometricSwitch));
    }

    #[test]
    fn test_invalid_login_shows_error() {
        let mut state = ready();
        type_text(&mut state, "nope");
        press(&mut state, KeyCode::Enter);
        assert_eq!(state.app.error(), Some("Invalid login"));
        assert_eq!(state.app.screen(), Screen::LoginForm);
    }

    #[test]
    fn test_enter_before_store_load_does_nothing() {
        let mut state = TuiState::new(false);
        type_text(&mut state, "test");
        press(&mut state, KeyCode::Tab);
        type_text(&mut state, "123");

        let effects = press(&mut state, KeyCode::Enter);

        assert!(effects.is_empty());
        assert_eq!(state.app.screen(), Screen::LoginForm);
        assert_eq!(state.app.login, Credentials::new("test", "123"));
        assert_eq!(state.app.error(), None);
    }

    #[test]
    fn test_space_on_switch_without_records_shows_notice() {
        let mut state = logged_in();
        let effects = press(&mut state, KeyCode::Char(' '));
        assert!(effects.is_empty());
        assert_eq!(state.app.notice, Some(Notice::no_records_for_settings()));
    }

    #[test]
    fn test_space_on_switch_with_records_opens_modal() {
        let mut state = logged_in();
        state.app.biometrics.records = true;
        press(&mut state, KeyCode::Char(' '));
        assert_eq!(state.app.screen(), Screen::SettingsModal);
        assert_eq!(state.focused(), Some(Control::ModalEmail));
    }

    #[test]
    fn test_biometric_login_requests_enrollment_check() {
        let mut state = TuiState::new(false);
        let snapshot = StoreSnapshot {
            email: Some("test".to_string()),
            password: Some("123".to_string()),
            flag: true,
        };
        update(
            &mut state,
            UiEvent::Core(Event::StoreLoaded(Ok(snapshot))),
            &FixedVerifier::default(),
        );
        let effects = press(&mut state, KeyCode::Enter);
        assert_eq!(effects, vec![Effect::CheckEnrollment(EnrollmentPurpose::Login)]);
        assert_eq!(state.app.pending, Some(Pending::EnrollmentCheck));
    }

    #[test]
    fn test_esc_closes_modal() {
        let mut state = logged_in();
        state.app.session.modal_visible = true;
        state.sync_focus();
        assert_eq!(state.focused(), Some(Control::ModalEmail));

        press(&mut state, KeyCode::Esc);
        assert_eq!(state.app.screen(), Screen::Settings);
    }

    #[test]
    fn test_notice_swallows_keys_until_dismissed() {
        let mut state = TuiState::new(false);
        state.app.notice = Some(Notice::no_records_for_login());

        type_text(&mut state, "abc");
        press(&mut state, KeyCode::Tab);
        assert!(state.app.login.email.is_empty());
        assert_eq!(state.focused(), Some(Control::LoginEmail));

        press(&mut state, KeyCode::Enter);
        assert!(state.app.notice.is_none());
    }

    #[test]
    fn test_paste_inserts_into_field_without_newlines() {
        let mut state = TuiState::new(false);
        update(
            &mut state,
            UiEvent::Terminal(TermEvent::Paste("te\nst".to_string())),
            &FixedVerifier::default(),
        );
        assert_eq!(state.app.login.email, "test");
    }

    #[test]
    fn test_key_release_is_ignored() {
        let mut state = TuiState::new(false);
        let release = KeyEvent {
            code: KeyCode::Char('x'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        update(
            &mut state,
            UiEvent::Terminal(TermEvent::Key(release)),
            &FixedVerifier::default(),
        );
        assert!(state.app.login.email.is_empty());
    }

    #[test]
    fn test_store_result_switches_to_biometric_form() {
        let mut state = TuiState::new(false);
        let snapshot = StoreSnapshot {
            email: Some("test".to_string()),
            password: Some("123".to_string()),
            flag: true,
        };
        update(
            &mut state,
            UiEvent::Core(Event::StoreLoaded(Ok(snapshot))),
            &FixedVerifier::default(),
        );
        assert_eq!(state.app.screen(), Screen::BiometricForm);
        assert_eq!(state.focused(), Some(Control::BiometricLogin));
    }

    #[test]
    fn test_tick_advances_spinner_only_when_busy() {
        let mut state = ready();
        update(&mut state, UiEvent::Tick, &FixedVerifier::default());
        assert_eq!(state.spinner_frame, 0);

        state.app.pending = Some(Pending::Authenticating);
        update(&mut state, UiEvent::Tick, &FixedVerifier::default());
        assert_eq!(state.spinner_frame, 1);
    }
}
