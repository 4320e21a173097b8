//! LayerKit Settings Crate
//!
//! Kernel tunables with TOML/JSON persistence.

pub mod config;
pub mod error;

pub use config::KernelSettings;
pub use error::{ConfigError, SettingsError, SettingsResult};
