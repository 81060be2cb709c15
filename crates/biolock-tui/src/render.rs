//! Rendering.
//!
//! Pure functions of [`TuiState`]; nothing here mutates state.

use biolock_core::state::{Pending, Screen};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::overlays;
use crate::overlays::render_utils::{InputHint, render_hints};
use crate::state::{Control, TuiState};

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Height of the dev-mode state panel (borders included).
const DEV_PANEL_HEIGHT: u16 = 9;

const LABEL_WIDTH: usize = 10;

pub fn render(state: &TuiState, frame: &mut Frame) {
    let area = frame.area();
    let dev_height = if state.dev_mode { DEV_PANEL_HEIGHT } else { 0 };
    let [main, dev, hints] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(dev_height),
        Constraint::Length(1),
    ])
    .areas(area);

    render_main(state, frame, main);
    if state.dev_mode {
        render_dev_panel(state, frame, dev);
    }
    render_hints(frame, hints, &key_hints(state), Color::Cyan);

    overlays::render(state, frame, main);
}

fn render_main(state: &TuiState, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" {} ", state.app.title()))
        .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

    let lines = match state.app.screen() {
        Screen::LoginForm => login_form_lines(state),
        Screen::BiometricForm => biometric_form_lines(state),
        Screen::Settings | Screen::SettingsModal => settings_lines(state),
    };
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn login_form_lines(state: &TuiState) -> Vec<Line<'static>> {
    let app = &state.app;
    let mut buttons = vec![Control::LoginButton];
    if app.biometrics.enabled {
        buttons.push(Control::UseBioLogin);
    }

    vec![
        Line::default(),
        error_line(state),
        Line::default(),
        field_line(state, Control::LoginEmail, &app.login.email, false),
        field_line(state, Control::LoginPassword, &app.login.password, true),
        busy_line(state),
        Line::default(),
        button_row(state, &buttons),
    ]
}

fn biometric_form_lines(state: &TuiState) -> Vec<Line<'static>> {
    let app = &state.app;
    vec![
        Line::default(),
        error_line(state),
        Line::default(),
        Line::from(vec![
            Span::styled(
                format!("{:<LABEL_WIDTH$}", "Account"),
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw(app.cached.email.clone()),
        ]),
        busy_line(state),
        Line::default(),
        button_row(state, &[Control::BiometricLogin, Control::UsePasswordLogin]),
    ]
}

fn settings_lines(state: &TuiState) -> Vec<Line<'static>> {
    let app = &state.app;
    let enabled = app.biometrics.enabled;
    let checkbox = if enabled { "[x]" } else { "[ ]" };
    let status = if enabled {
        "Biometrics are currently enabled"
    } else {
        "Biometrics are currently disabled"
    };

    vec![
        Line::default(),
        error_line(state),
        Line::default(),
        Line::from(vec![
            Span::styled(
                format!("{checkbox} "),
                control_style(state, Control::BiometricSwitch),
            ),
            Span::styled(
                Control::BiometricSwitch.label(),
                control_style(state, Control::BiometricSwitch),
            ),
        ]),
        Line::styled(status, Style::default().fg(Color::DarkGray)),
        busy_line(state),
        Line::default(),
        button_row(state, &[Control::Logout]),
    ]
}

fn render_dev_panel(state: &TuiState, frame: &mut Frame, area: Rect) {
    let app = &state.app;
    let row = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(
                format!("{label:<16}"),
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw(value),
        ])
    };
    let lines = vec![
        row("saved email", app.cached.email.clone()),
        row("saved password", app.cached.password.clone()),
        row("email", app.login.email.clone()),
        row("password", app.login.password.clone()),
        row("bio enabled", app.biometrics.enabled.to_string()),
        row("bio records", app.biometrics.records.to_string()),
        row("pending", format!("{:?}", app.pending)),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(" State ");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn key_hints(state: &TuiState) -> Vec<InputHint<'static>> {
    if state.app.notice.is_some() {
        return vec![InputHint::new("Enter", "dismiss")];
    }
    let mut hints = vec![
        InputHint::new("Tab", "next"),
        InputHint::new("Enter", "select"),
    ];
    match state.app.screen() {
        Screen::Settings => hints.push(InputHint::new("Space", "toggle")),
        Screen::SettingsModal => hints.push(InputHint::new("Esc", "close")),
        Screen::LoginForm | Screen::BiometricForm => {}
    }
    hints.push(InputHint::new("Ctrl+C", "quit"));
    hints
}

// ============================================================================
// Shared widgets
// ============================================================================

pub(crate) fn control_style(state: &TuiState, control: Control) -> Style {
    if state.is_focused(control) && state.app.notice.is_none() {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

/// `Label     value█`; passwords are masked.
pub(crate) fn field_line(
    state: &TuiState,
    control: Control,
    value: &str,
    masked: bool,
) -> Line<'static> {
    let focused = state.is_focused(control) && state.app.notice.is_none();
    let shown = if masked {
        "•".repeat(value.chars().count())
    } else {
        value.to_string()
    };
    let label_style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let mut spans = vec![
        Span::styled(format!("{:<LABEL_WIDTH$}", control.label()), label_style),
        Span::styled(shown, Style::default().fg(Color::White)),
    ];
    if focused {
        spans.push(Span::styled("█", Style::default().fg(Color::Cyan)));
    }
    Line::from(spans)
}

pub(crate) fn button_row(state: &TuiState, buttons: &[Control]) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, control) in buttons.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(
            format!("[ {} ]", control.label()),
            control_style(state, *control),
        ));
    }
    Line::from(spans)
}

pub(crate) fn error_line(state: &TuiState) -> Line<'static> {
    match state.app.error() {
        Some(error) => Line::styled(error.to_string(), Style::default().fg(Color::Red)),
        None => Line::default(),
    }
}

pub(crate) fn busy_line(state: &TuiState) -> Line<'static> {
    let text = match state.app.pending {
        Some(Pending::EnrollmentCheck) => "Checking biometric records...",
        Some(Pending::Authenticating) => "Waiting for biometric prompt...",
        Some(Pending::Saving) => "Saving credentials...",
        Some(Pending::Clearing) => "Removing saved credentials...",
        None if !state.app.loaded => "Loading saved credentials...",
        None => return Line::default(),
    };
    let spinner = SPINNER_FRAMES[state.spinner_frame % SPINNER_FRAMES.len()];
    Line::styled(
        format!("{spinner} {text}"),
        Style::default().fg(Color::Yellow),
    )
}

#[cfg(test)]
pub(crate) mod test_support {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::render;
    use crate::state::TuiState;

    /// Renders into a test buffer and returns its text, one line per row.
    pub fn render_to_string(state: &TuiState, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(state, frame)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }
}
