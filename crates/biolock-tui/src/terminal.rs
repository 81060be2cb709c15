//! Raw-mode terminal for the login screen.
//!
//! The login screen owns the alternate screen from mount until the user
//! quits. Cooked mode and the primary screen come back when the runtime is
//! dropped, and also when a panic unwinds through it, so a failed login
//! session never leaves the shell echo-less.

use std::io::{self, Stdout};
use std::panic;

use anyhow::{Context, Result};
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

/// Switches to raw mode on the alternate screen before the login form is
/// first drawn. Bracketed paste stays on so a pasted password arrives as a
/// single edit.
///
/// # Errors
/// Returns an error if stdout is not a usable terminal.
pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
        .context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;
    Ok(terminal)
}

/// Hands the terminal back to the shell once the login screen closes.
/// Runs from both the runtime's `Drop` and the panic hook, so a second call
/// must be harmless.
///
/// # Errors
/// Returns an error if the terminal refuses to leave raw mode.
pub fn restore_terminal() -> Result<()> {
    // Fine when paste mode was never enabled.
    let _ = execute!(io::stdout(), DisableBracketedPaste);

    // Leave alternate screen while still in raw mode.
    execute!(io::stdout(), LeaveAlternateScreen).context("Failed to leave alternate screen")?;
    disable_raw_mode().context("Failed to disable raw mode")?;
    Ok(())
}

/// Makes a panic inside the login screen print to a restored terminal.
/// Must run before [`setup_terminal`].
pub fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}
