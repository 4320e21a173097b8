//! Error types for the settings crate.
//!
//! Loading and saving errors are reported as [`SettingsError`]; values
//! that parse but fall outside their valid range are [`ConfigError`]s.

use layerkit_core::GeometryError;
use std::io;
use thiserror::Error;

/// Errors that can occur during settings operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The settings file could not be loaded.
    #[error("Failed to load settings: {0}")]
    LoadError(String),

    /// The settings file could not be saved.
    #[error("Failed to save settings: {0}")]
    SaveError(String),

    /// A setting was rejected by the kernel stage it configures.
    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    /// A configuration validation error occurred.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl From<GeometryError> for SettingsError {
    fn from(err: GeometryError) -> Self {
        match err {
            GeometryError::InvalidParameter { name, reason } => {
                SettingsError::InvalidSetting { key: name, reason }
            }
            other => SettingsError::InvalidSetting {
                key: "geometry".to_string(),
                reason: other.to_string(),
            },
        }
    }
}

/// Errors related to configuration validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The settings file format is not supported.
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// A configuration value is out of valid range.
    #[error("Value out of range for '{key}': {value}")]
    ValueOutOfRange { key: String, value: String },
}

/// Result type alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_error_display() {
        let err = SettingsError::LoadError("file not found".to_string());
        assert_eq!(err.to_string(), "Failed to load settings: file not found");

        let err = SettingsError::InvalidSetting {
            key: "resolution".to_string(),
            reason: "must be positive".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid setting 'resolution': must be positive"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::UnsupportedFormat("yaml".to_string());
        assert_eq!(err.to_string(), "Unsupported config format: yaml");

        let err = ConfigError::ValueOutOfRange {
            key: "simplify.radius".to_string(),
            value: "-1".to_string(),
        };
        assert_eq!(err.to_string(), "Value out of range for 'simplify.radius': -1");
    }

    #[test]
    fn test_error_conversion() {
        let settings_err: SettingsError = ConfigError::UnsupportedFormat("ini".to_string()).into();
        assert!(matches!(settings_err, SettingsError::Config(_)));

        let geometry_err = GeometryError::InvalidParameter {
            name: "hop_dot".to_string(),
            reason: "must lie in [-1, 1], got 2".to_string(),
        };
        let settings_err: SettingsError = geometry_err.into();
        assert!(matches!(
            settings_err,
            SettingsError::InvalidSetting { ref key, .. } if key == "hop_dot"
        ));

        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let settings_err: SettingsError = io_err.into();
        assert!(matches!(settings_err, SettingsError::IoError(_)));
    }
}
