//! Configuration management for biolock.
//!
//! Loads configuration from ${BIOLOCK_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for biolock configuration and data.
    //!
    //! BIOLOCK_HOME resolution order:
    //! 1. BIOLOCK_HOME environment variable (if set)
    //! 2. ~/.config/biolock (default)
    //! 3. ./.biolock when no home directory can be determined

    use std::path::PathBuf;

    /// Returns the biolock home directory.
    pub fn biolock_home() -> PathBuf {
        if let Ok(home) = std::env::var("BIOLOCK_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".biolock"),
            |h| h.join(".config").join("biolock"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        biolock_home().join("config.toml")
    }

    /// Returns the default path of the file-backed secure store.
    pub fn store_path() -> PathBuf {
        biolock_home().join("secure-store.json")
    }

    /// Returns the directory for log files.
    pub fn logs_dir() -> PathBuf {
        biolock_home().join("logs")
    }
}

/// The credential pair accepted by the login form and the settings modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    pub email: String,
    pub password: String,
}

impl VerificationConfig {
    pub const DEFAULT_EMAIL: &str = "test";
    pub const DEFAULT_PASSWORD: &str = "123";
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            email: Self::DEFAULT_EMAIL.to_string(),
            password: Self::DEFAULT_PASSWORD.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    File,
    Memory,
}

/// Secure store configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Overrides the default `secure-store.json` location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl StoreConfig {
    /// Returns the file store path, preferring the configured override.
    pub fn effective_path(&self) -> PathBuf {
        self.path
            .as_deref()
            .map_or_else(paths::store_path, PathBuf::from)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BiometricBackend {
    #[default]
    Simulated,
    Command,
}

/// Outcome reported by the simulated biometric prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SimulatedOutcome {
    #[default]
    Approve,
    Deny,
    Cancel,
}

/// Biometric subsystem configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiometricConfig {
    pub backend: BiometricBackend,
    /// Simulated enrollment.
    pub enrolled: bool,
    /// Simulated prompt outcome.
    pub outcome: SimulatedOutcome,
    /// Text shown by the biometric prompt.
    pub prompt: String,
    /// argv of the enrollment check (command backend).
    pub enroll_command: Vec<String>,
    /// argv of the verify prompt (command backend).
    pub verify_command: Vec<String>,
}

impl BiometricConfig {
    pub const DEFAULT_PROMPT: &str = "Login with Biometrics";
}

impl Default for BiometricConfig {
    fn default() -> Self {
        Self {
            backend: BiometricBackend::default(),
            enrolled: true,
            outcome: SimulatedOutcome::default(),
            prompt: Self::DEFAULT_PROMPT.to_string(),
            enroll_command: Vec::new(),
            verify_command: Vec::new(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Render the debug "State" footer (prints secrets).
    pub dev_mode: bool,

    /// tracing filter directive for the file log.
    pub log_level: String,

    pub verification: VerificationConfig,

    pub store: StoreConfig,

    pub biometric: BiometricConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dev_mode: false,
            log_level: Self::DEFAULT_LOG_LEVEL.to_string(),
            verification: VerificationConfig::default(),
            store: StoreConfig::default(),
            biometric: BiometricConfig::default(),
        }
    }
}

impl Config {
    const DEFAULT_LOG_LEVEL: &str = "info";

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    ///
    /// # Errors
    /// Returns an error if the file exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Renders the built-in defaults as TOML (no comments).
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn generate() -> Result<String> {
        toml::to_string(&Config::default()).context("Failed to serialize default config to TOML")
    }

    /// Writes through a temp file + rename so a crash never leaves half a file.
    fn write_config(path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, contents)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    /// Config loading: missing file returns defaults.
    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nonexistent.toml");

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.verification.email, "test");
        assert_eq!(config.verification.password, "123");
    }

    /// Config loading: partial config merges with defaults.
    #[test]
    fn test_load_partial_config_merges_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(
            &config_path,
            "dev_mode = true\n[biometric]\noutcome = \"cancel\"\n",
        )
        .unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert!(config.dev_mode);
        assert_eq!(config.biometric.outcome, SimulatedOutcome::Cancel);
        assert!(config.biometric.enrolled);
        assert_eq!(config.biometric.prompt, "Login with Biometrics");
        assert_eq!(config.store.backend, StoreBackend::File);
    }

    #[test]
    fn test_load_invalid_toml_reports_path() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "dev_mode = [").unwrap();

        let err = Config::load_from(&config_path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config"));
    }

    #[test]
    fn test_default_template_matches_defaults() {
        let parsed: Config = toml::from_str(default_config_template()).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_generate_round_trips() {
        let generated = Config::generate().unwrap();
        let parsed: Config = toml::from_str(&generated).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("sub").join("config.toml");

        Config::init(&config_path).unwrap();
        assert!(config_path.exists());

        let err = Config::init(&config_path).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_store_path_override() {
        let store = StoreConfig {
            backend: StoreBackend::File,
            path: Some("/tmp/elsewhere.json".to_string()),
        };
        assert_eq!(store.effective_path(), PathBuf::from("/tmp/elsewhere.json"));
    }
}
