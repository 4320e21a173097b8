//! Kernel tunables
//!
//! [`KernelSettings`] gathers the configuration of every stage that takes
//! tunables. Missing sections and keys fall back to their defaults, so a
//! settings file only needs to name what it changes.

use crate::error::{ConfigError, SettingsError, SettingsResult};
use layerkit_geometry::{FillConfig, FillGenerator, PathStitcher, SimplifyConfig, StitchConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Complete kernel configuration
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelSettings {
    /// Path stitching
    pub stitch: StitchConfig,
    /// Infill generation
    pub fill: FillConfig,
    /// Outline simplification
    pub simplify: SimplifyConfig,
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> SettingsResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(ConfigError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )
        .into()),
    }
}

impl KernelSettings {
    /// Create settings with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks every section against the stage it configures.
    pub fn validate(&self) -> SettingsResult<()> {
        self.stitch.validate()?;
        self.fill.validate()?;
        if !(self.simplify.radius >= 0.0 && self.simplify.radius.is_finite()) {
            return Err(ConfigError::ValueOutOfRange {
                key: "simplify.radius".to_string(),
                value: self.simplify.radius.to_string(),
            }
            .into());
        }
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> SettingsResult<Self> {
        let settings: Self = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_toml_string(&self) -> SettingsResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load settings from file (JSON or TOML, chosen by extension)
    pub fn load(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;
        let settings: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };
        settings.validate()?;
        info!(path = %path.display(), "loaded kernel settings");
        Ok(settings)
    }

    /// Save settings to file (JSON or TOML, chosen by extension)
    pub fn save(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => self.to_toml_string()?,
        };
        std::fs::write(path, content).map_err(|e| {
            SettingsError::SaveError(format!("{}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "saved kernel settings");
        Ok(())
    }

    pub fn stitcher(&self) -> SettingsResult<PathStitcher> {
        Ok(PathStitcher::new(self.stitch)?)
    }

    pub fn fill_generator(&self) -> SettingsResult<FillGenerator> {
        Ok(FillGenerator::new(self.fill)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layerkit_geometry::BooleanRule;

    #[test]
    fn test_defaults() {
        let settings = KernelSettings::new();
        assert_eq!(settings.stitch.resolution, 0.4);
        assert_eq!(settings.stitch.fill_inset, 0.2);
        assert_eq!(settings.stitch.candidate_cap, 15);
        assert_eq!(settings.stitch.doubling_back_dot, 0.9);
        assert_eq!(settings.stitch.hop_dot, 0.9);
        assert_eq!(settings.fill.line_spacing, 0.4);
        assert_eq!(settings.fill.angle_degrees, 45.0);
        assert_eq!(settings.simplify.radius, 0.05);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = KernelSettings::from_toml_str(
            "[stitch]\nresolution = 0.8\n\n[fill]\nrule = { at_least = 2 }\n",
        )
        .unwrap();
        assert_eq!(settings.stitch.resolution, 0.8);
        assert_eq!(settings.stitch.candidate_cap, 15);
        assert_eq!(settings.fill.rule, BooleanRule::AtLeast(2));
        assert_eq!(settings.simplify, SimplifyConfig::default());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut settings = KernelSettings::new();
        settings.fill.rule = BooleanRule::AtLeast(3);
        settings.stitch.fallback_scan = false;
        let text = settings.to_toml_string().unwrap();
        assert_eq!(KernelSettings::from_toml_str(&text).unwrap(), settings);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = KernelSettings::from_toml_str("[stitch]\nresolution = -1.0\n").unwrap_err();
        assert!(matches!(err, SettingsError::InvalidSetting { ref key, .. } if key == "resolution"));

        let err = KernelSettings::from_toml_str("[simplify]\nradius = -0.5\n").unwrap_err();
        assert!(matches!(err, SettingsError::Config(ConfigError::ValueOutOfRange { .. })));

        assert!(matches!(
            KernelSettings::from_toml_str("[stitch\n"),
            Err(SettingsError::TomlError(_))
        ));
    }

    #[test]
    fn test_save_and_load_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = KernelSettings::new();
        settings.fill.angle_degrees = 90.0;

        for name in ["kernel.toml", "kernel.json"] {
            let path = dir.path().join(name);
            settings.save(&path).unwrap();
            assert_eq!(KernelSettings::load(&path).unwrap(), settings);
        }
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kernel.yaml");
        assert!(matches!(
            KernelSettings::new().save(&path),
            Err(SettingsError::Config(ConfigError::UnsupportedFormat(_)))
        ));
        assert!(matches!(
            KernelSettings::load(&dir.path().join("missing.toml")),
            Err(SettingsError::LoadError(_))
        ));
    }

    #[test]
    fn test_builds_stages() {
        let settings = KernelSettings::new();
        assert!(settings.stitcher().is_ok());
        assert!(settings.fill_generator().is_ok());
    }
}
