//! CLI command handlers.

pub mod biometrics;
pub mod config;
pub mod login;
pub mod store;
