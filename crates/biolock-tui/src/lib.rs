//! Full-screen terminal UI for biolock.

pub mod events;
pub mod overlays;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, stderr};

use anyhow::Result;
use biolock_core::Services;
pub use runtime::TuiRuntime;

/// Runs the login screen until the user quits.
///
/// Must be called from within a tokio runtime context: effects run on the
/// blocking pool.
///
/// # Errors
/// Returns an error if stderr is not a terminal or terminal I/O fails.
pub fn run(services: Services, dev_mode: bool) -> Result<()> {
    if !stderr().is_terminal() {
        anyhow::bail!(
            "biolock requires a terminal.\n\
             Use `biolock store show` or `biolock biometrics check` for non-interactive use."
        );
    }

    let mut runtime = TuiRuntime::new(services, dev_mode)?;
    runtime.run()
}
