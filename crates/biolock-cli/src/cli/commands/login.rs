//! Interactive login screen.

use anyhow::Result;
use biolock_core::config::Config;

/// How long quitting waits for effect workers still blocked in an adapter.
#[cfg(feature = "tui")]
const SHUTDOWN_GRACE: std::time::Duration = std::time::Duration::from_millis(500);

#[cfg(feature = "tui")]
pub fn run(config: &Config) -> Result<()> {
    use biolock_core::Services;

    let services = Services::from_config(config);
    with_runtime(|| biolock_tui::run(services, config.dev_mode))?
}

#[cfg(not(feature = "tui"))]
pub fn run(_config: &Config) -> Result<()> {
    anyhow::bail!("biolock was built without the terminal UI (enable the `tui` feature)")
}

/// Runs `f` with a fresh tokio runtime entered (one runtime for the effect
/// workers). Workers still blocked when `f` returns are abandoned after
/// [`SHUTDOWN_GRACE`] instead of being waited on.
#[cfg(feature = "tui")]
fn with_runtime<T>(f: impl FnOnce() -> T) -> Result<T> {
    use anyhow::Context;

    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    let value = {
        let _enter = rt.enter();
        f()
    };
    rt.shutdown_timeout(SHUTDOWN_GRACE);
    Ok(value)
}
