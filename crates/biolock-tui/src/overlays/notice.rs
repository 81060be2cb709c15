use biolock_core::state::Notice;
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Paragraph, Wrap};

use super::render_utils::render_overlay;

pub fn render(notice: &Notice, frame: &mut Frame, area: Rect) {
    let inner = render_overlay(frame, area, &notice.title, Color::Red, (48, 7));

    let lines = vec![
        Line::from(notice.message.as_str()),
        Line::default(),
        Line::styled(
            format!("[ {} ]", notice.button),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
        ),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        inner,
    );
}
