//! Overlays drawn above the main screen.
//!
//! - `modal.rs`: "Save Login for Biometrics" credential modal
//! - `notice.rs`: blocking notice with a single button
//! - `render_utils.rs`: shared overlay layout helpers
//!
//! Input routing for overlays lives in the reducer: the core state decides
//! which overlay is up, so there is no separate overlay state here.

pub mod modal;
pub mod notice;
pub mod render_utils;

use biolock_core::state::Screen;
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::state::TuiState;

/// Renders whichever overlays are active. The notice goes on top.
pub fn render(state: &TuiState, frame: &mut Frame, area: Rect) {
    if state.app.screen() == Screen::SettingsModal {
        modal::render(state, frame, area);
    }
    if let Some(notice) = &state.app.notice {
        notice::render(notice, frame, area);
    }
}
