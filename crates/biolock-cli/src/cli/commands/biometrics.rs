//! Biometric command handlers.

use anyhow::{Context, Result};
use biolock_core::biometric::{self, AuthOutcome};
use biolock_core::config::Config;

pub fn check(config: &Config) -> Result<()> {
    let biometrics = biometric::from_config(&config.biometric);
    let enrolled = biometrics
        .is_enrolled()
        .context("query biometric enrollment")?;
    let backend = format!("{:?}", config.biometric.backend).to_lowercase();
    if enrolled {
        println!("Biometric records enrolled ({backend} backend)");
    } else {
        println!("No biometric records found ({backend} backend)");
    }
    Ok(())
}

/// Shows the configured prompt once. Anything but success is an error.
pub fn verify(config: &Config) -> Result<()> {
    let biometrics = biometric::from_config(&config.biometric);
    let outcome = biometrics
        .authenticate(&config.biometric.prompt)
        .context("show biometric prompt")?;
    tracing::info!(?outcome, "biometric verify from the command line");
    match outcome {
        AuthOutcome::Success => {
            println!("Biometric authentication succeeded");
            Ok(())
        }
        AuthOutcome::Failed => anyhow::bail!("Biometric authentication failed"),
        AuthOutcome::Cancelled => anyhow::bail!("Biometric login cancelled"),
    }
}
