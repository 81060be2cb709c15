//! Core biolock library (login state machine, secure store, biometrics, config).
//!
//! The crate is UI-agnostic: `update` is a pure reducer over [`state::AppState`]
//! and every side effect is described by an [`effects::Effect`] that a driver
//! executes against the injected capabilities in [`driver::Services`].

pub mod biometric;
pub mod config;
pub mod credentials;
pub mod driver;
pub mod effects;
pub mod error;
pub mod events;
pub mod logging;
pub mod state;
pub mod store;
pub mod update;
pub mod verify;

pub use driver::{Driver, Services};
pub use state::{AppState, Screen};
