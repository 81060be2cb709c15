//! Credential modal shown while enabling biometric login.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;

use super::render_utils::render_overlay;
use crate::render::{busy_line, button_row, error_line, field_line};
use crate::state::{Control, TuiState};

pub const TITLE: &str = "Save Login for Biometrics";

pub fn render(state: &TuiState, frame: &mut Frame, area: Rect) {
    let inner = render_overlay(frame, area, TITLE, Color::Yellow, (52, 11));
    let modal = &state.app.modal;

    let lines = vec![
        Line::styled(
            "Enter the credentials to use with biometrics",
            Style::default().fg(Color::DarkGray),
        ),
        error_line(state),
        field_line(state, Control::ModalEmail, &modal.email, false),
        field_line(state, Control::ModalPassword, &modal.password, true),
        busy_line(state),
        Line::default(),
        button_row(state, &[Control::SaveLogin, Control::Close]),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

#[cfg(test)]
mod tests {
    use biolock_core::credentials::Credentials;

    use super::*;
    use crate::render::test_support::render_to_string;

    #[test]
    fn test_modal_renders_over_settings() {
        let mut state = TuiState::new(false);
        state.app.session.logged_in = true;
        state.app.session.modal_visible = true;
        state.app.modal = Credentials::new("test", "123");
        state.sync_focus();

        let screen = render_to_string(&state, 70, 20);
        assert!(screen.contains(TITLE));
        assert!(screen.contains("[ Save Login ]"));
        assert!(screen.contains("[ Close ]"));
        assert!(screen.contains("•••"));
        assert!(!screen.contains("123"));
    }
}
