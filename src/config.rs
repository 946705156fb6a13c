//! Configuration management and validation
//!
//! Settings resolve in layers: built-in defaults, then an optional TOML
//! config file, then command-line overrides applied by the individual
//! commands. Every section is optional in the file; missing keys fall back
//! to their defaults.

use crate::constants::{self, geo};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Top-level configuration for reconciliation runs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Batch pipeline behavior
    pub pipeline: PipelineConfig,

    /// Coordinate reprojection settings
    pub reproject: ReprojectConfig,

    /// Id remap table column names
    pub remap: RemapConfig,

    /// Default units_multiplier edit
    pub multiplier: MultiplierConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Batch pipeline behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Keep a `.bak` sibling before the first in-place edit of a file
    pub backup: bool,

    /// Show progress bars during batch runs
    pub show_progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            backup: true,
            show_progress: true,
        }
    }
}

/// Coordinate reprojection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReprojectConfig {
    /// EPSG code geographic coordinates are read in
    pub source_epsg: u32,

    /// EPSG code projected coordinates are written in
    pub target_epsg: u32,
}

impl Default for ReprojectConfig {
    fn default() -> Self {
        Self {
            source_epsg: geo::DEFAULT_SOURCE_EPSG,
            target_epsg: geo::DEFAULT_TARGET_EPSG,
        }
    }
}

/// Column names of the id remap table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemapConfig {
    /// Column holding the ids to replace
    pub from_column: String,

    /// Column holding the canonical ids
    pub to_column: String,
}

impl Default for RemapConfig {
    fn default() -> Self {
        Self {
            from_column: "ingestion_id".to_string(),
            to_column: "station_id".to_string(),
        }
    }
}

/// Default units_multiplier edit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiplierConfig {
    /// Channel whose multiplier is edited
    pub channel: String,

    /// Multiplier value to set
    pub value: String,
}

impl Default for MultiplierConfig {
    fn default() -> Self {
        Self {
            channel: constants::DEFAULT_MULTIPLIER_CHANNEL.to_string(),
            value: constants::DEFAULT_MULTIPLIER_VALUE.to_string(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Default config file location (`~/.config/smet_reconciler/config.toml`
    /// on Linux)
    pub fn default_config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("smet_reconciler").join("config.toml"))
            .ok_or_else(|| {
                Error::configuration("could not determine user configuration directory")
            })
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            Error::io(format!("failed to read config file '{}'", path.display()), e)
        })?;

        let config: Self = toml::from_str(&text).map_err(|e| {
            Error::configuration(format!("invalid config file '{}': {}", path.display(), e))
        })?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load configuration in layers: defaults, then an optional file
    ///
    /// An explicitly named file must exist; the default location is used
    /// only when present. Command-line overrides are applied afterwards by
    /// the individual commands.
    pub fn load_layered(config_file: Option<&Path>) -> Result<Self> {
        match config_file {
            Some(path) => {
                info!("Using config file: {}", path.display());
                Self::load(path)
            }
            None => {
                let default_path = Self::default_config_path().ok();
                match default_path.filter(|path| path.exists()) {
                    Some(path) => {
                        info!("Using config file: {}", path.display());
                        Self::load(&path)
                    }
                    None => {
                        debug!("No config file found, using defaults");
                        Ok(Self::default())
                    }
                }
            }
        }
    }

    /// Validate configuration consistency
    pub fn validate(&self) -> Result<()> {
        const LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];
        if !LEVELS.contains(&self.logging.level.as_str()) {
            return Err(Error::configuration(format!(
                "invalid log level '{}' (expected one of: {})",
                self.logging.level,
                LEVELS.join(", ")
            )));
        }

        if !constants::is_valid_field_name(&self.multiplier.channel) {
            return Err(Error::configuration(format!(
                "invalid multiplier channel '{}'",
                self.multiplier.channel
            )));
        }

        if self.multiplier.value.trim().is_empty() {
            return Err(Error::configuration("multiplier value must not be empty"));
        }

        if self.remap.from_column.trim().is_empty() || self.remap.to_column.trim().is_empty() {
            return Err(Error::configuration(
                "remap table column names must not be empty",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();

        assert!(config.validate().is_ok());
        assert!(config.pipeline.backup);
        assert_eq!(config.reproject.source_epsg, 4326);
        assert_eq!(config.reproject.target_epsg, 3035);
        assert_eq!(config.multiplier.channel, "PSUM");
        assert_eq!(config.multiplier.value, "1");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[multiplier]\nchannel = \"HS\"\n").unwrap();

        let config = Config::load(&path).unwrap();

        assert_eq!(config.multiplier.channel, "HS");
        assert_eq!(config.multiplier.value, "1");
        assert_eq!(config.remap.from_column, "ingestion_id");
        assert!(config.pipeline.show_progress);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "not valid toml [[[").unwrap();

        assert!(matches!(
            Config::load(&path),
            Err(Error::Configuration { .. })
        ));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = Config::load(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_channel() {
        let mut config = Config::default();
        config.multiplier.channel = "PS UM".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_roundtrips_through_toml() {
        let config = Config::default();
        let text = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();

        assert_eq!(parsed.multiplier.channel, config.multiplier.channel);
        assert_eq!(parsed.reproject.target_epsg, config.reproject.target_epsg);
    }
}
