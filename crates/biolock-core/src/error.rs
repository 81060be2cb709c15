//! Error types for the capability adapters.
//!
//! Adapter failures are typed so the reducer can map them onto user-facing
//! messages; application edges wrap them in `anyhow`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure of a secure key-value store operation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read secure store at {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write secure store at {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("secure store at {} is not valid JSON", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("secure store unavailable: {0}")]
    Unavailable(String),
}

/// Failure of the biometric subsystem itself (not a rejected match).
#[derive(Debug, Error)]
pub enum BiometricError {
    #[error("biometric {0} command is not configured")]
    NotConfigured(&'static str),

    #[error("failed to run biometric command `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("biometric backend unavailable: {0}")]
    Unavailable(String),
}
