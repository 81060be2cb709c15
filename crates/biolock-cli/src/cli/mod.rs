//! CLI entry and dispatch.

use anyhow::{Context, Result};
use biolock_core::config::{self, StoreBackend};
use biolock_core::logging::WorkerGuard;
use clap::Parser;

mod commands;

#[derive(Parser)]
#[command(name = "biolock")]
#[command(version)]
#[command(about = "Terminal login screen with optional biometric unlock")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Show the debug "State" panel (prints saved secrets)
    #[arg(long, env = "BIOLOCK_DEV")]
    dev: bool,

    /// Keep saved credentials in memory for this run only
    #[arg(long)]
    ephemeral: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Inspect or reset the secure credential store
    Store {
        #[command(subcommand)]
        command: StoreCommands,
    },

    /// Query the configured biometric backend
    Biometrics {
        #[command(subcommand)]
        command: BiometricCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Print the config file path
    Path,
    /// Write the default config file
    Init,
    /// Print the default configuration as TOML
    Generate,
}

#[derive(clap::Subcommand)]
enum StoreCommands {
    /// Show which keys are saved
    Show {
        /// Print the saved password instead of redacting it
        #[arg(long)]
        reveal: bool,
    },
    /// Remove the saved email, password and enabled flag
    Clear,
}

#[derive(clap::Subcommand)]
enum BiometricCommands {
    /// Report whether biometric records are enrolled
    Check,
    /// Show the biometric prompt once and report the outcome
    Verify,
}

pub fn run() -> Result<()> {
    let Cli {
        command,
        dev,
        ephemeral,
    } = Cli::parse();

    match command {
        // Config commands must work even when the config file is broken.
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::Generate => commands::config::generate(),
        },
        None => {
            let (config, _log_guard) = load_config(dev, ephemeral)?;
            commands::login::run(&config)
        }
        Some(Commands::Store { command }) => {
            let (config, _log_guard) = load_config(dev, ephemeral)?;
            match command {
                StoreCommands::Show { reveal } => commands::store::show(&config, reveal),
                StoreCommands::Clear => commands::store::clear(&config),
            }
        }
        Some(Commands::Biometrics { command }) => {
            let (config, _log_guard) = load_config(dev, ephemeral)?;
            match command {
                BiometricCommands::Check => commands::biometrics::check(&config),
                BiometricCommands::Verify => commands::biometrics::verify(&config),
            }
        }
    }
}

/// Loads config, applies flag overrides, and starts file logging.
///
/// The returned guard must outlive the command so buffered log lines flush.
fn load_config(dev: bool, ephemeral: bool) -> Result<(config::Config, WorkerGuard)> {
    let mut config = config::Config::load().context("load config")?;
    if ephemeral {
        config.store.backend = StoreBackend::Memory;
    }
    config.dev_mode |= dev;

    let guard = biolock_core::logging::init_logging(&config).context("init logging")?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "biolock starting");
    Ok((config, guard))
}
