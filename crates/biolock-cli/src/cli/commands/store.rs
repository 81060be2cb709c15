//! Secure store command handlers.

use anyhow::{Context, Result};
use biolock_core::Services;
use biolock_core::config::{Config, StoreBackend};
use biolock_core::store::StoreKey;

/// Prints each saved key. The password is redacted unless `reveal` is set.
pub fn show(config: &Config, reveal: bool) -> Result<()> {
    let services = Services::from_config(config);
    println!("{}", location(config));

    for key in StoreKey::ALL {
        let value = services
            .store
            .get(key)
            .with_context(|| format!("read '{}'", key.as_str()))?;
        let shown = match value {
            None => "(not set)".to_string(),
            Some(_) if key.is_secret() && !reveal => "********".to_string(),
            Some(value) => value,
        };
        println!("{:<10} {shown}", key.as_str());
    }

    let snapshot = services.cache().load().context("load saved credentials")?;
    let status = if snapshot.biometrics_enabled() {
        "enabled"
    } else {
        "disabled"
    };
    println!("biometric login: {status}");
    Ok(())
}

pub fn clear(config: &Config) -> Result<()> {
    let services = Services::from_config(config);
    services
        .cache()
        .clear()
        .context("clear saved credentials")?;
    tracing::info!("secure store cleared from the command line");
    println!("Cleared saved credentials ({})", location(config));
    Ok(())
}

fn location(config: &Config) -> String {
    match config.store.backend {
        StoreBackend::File => format!("store: {}", config.store.effective_path().display()),
        StoreBackend::Memory => "store: memory (nothing persists)".to_string(),
    }
}
