use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::classify::ThresholdTable;
use crate::errors::{MangoRipenessError, Result};

/// Zoom range offered to users, in percent
pub const MIN_USER_ZOOM_PERCENT: u32 = 10;
pub const MAX_USER_ZOOM_PERCENT: u32 = 50;

/// Configuration for the mango ripeness analyzer
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    pub input_path: String,
    pub output_base_dir: String,

    /// How far each edge is inset before averaging, in percent
    #[serde(default = "default_zoom_percent")]
    pub zoom_percent: u32,

    #[serde(default = "default_parallel")]
    pub use_parallel: bool,

    /// Save the crop and a crop+swatch preview for every analyzed image
    #[serde(default = "default_save_crops")]
    pub save_crops: bool,

    /// Edge length of the color swatch in pixels
    #[serde(default = "default_swatch_size")]
    pub swatch_size: u32,

    // Kept last: TOML needs plain values before arrays of tables
    #[serde(default)]
    pub thresholds: ThresholdTable,
}

fn default_zoom_percent() -> u32 {
    40
}

fn default_parallel() -> bool {
    true
}

fn default_save_crops() -> bool {
    true
}

fn default_swatch_size() -> u32 {
    100
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: "./input".to_string(),
            output_base_dir: "./output".to_string(),
            zoom_percent: default_zoom_percent(),
            use_parallel: default_parallel(),
            save_crops: default_save_crops(),
            swatch_size: default_swatch_size(),
            thresholds: ThresholdTable::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            MangoRipenessError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        Self::from_toml_str(&content).map_err(|e| match e {
            MangoRipenessError::ConfigLoad { source, .. } => MangoRipenessError::ConfigLoad {
                source,
                path: path.to_path_buf(),
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|source| MangoRipenessError::ConfigLoad {
            source,
            path: PathBuf::from("<inline>"),
        })
    }

    /// Check the analysis parameters; does not touch the file system
    pub fn validate_parameters(&self) -> Result<()> {
        if self.zoom_percent < MIN_USER_ZOOM_PERCENT || self.zoom_percent > MAX_USER_ZOOM_PERCENT {
            return Err(MangoRipenessError::InvalidZoom {
                zoom_percent: self.zoom_percent,
                reason: format!(
                    "zoom_percent must be between {} and {}",
                    MIN_USER_ZOOM_PERCENT, MAX_USER_ZOOM_PERCENT
                ),
            });
        }

        if self.swatch_size == 0 {
            return Err(MangoRipenessError::Config(
                "swatch_size must be > 0".to_string(),
            ));
        }

        self.thresholds.validate()
    }

    /// Validate configuration and prepare output directories
    pub fn validate(&self) -> Result<()> {
        let input_path = PathBuf::from(&self.input_path);
        if !input_path.exists() {
            return Err(MangoRipenessError::InvalidPath(input_path));
        }

        self.validate_parameters()?;

        let base_dir = PathBuf::from(&self.output_base_dir);
        fs::create_dir_all(&base_dir).map_err(|e| {
            MangoRipenessError::Config(format!(
                "Failed to create output directory '{}': {}",
                base_dir.display(),
                e
            ))
        })?;

        if self.save_crops {
            fs::create_dir_all(base_dir.join("crops"))?;
        }

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            MangoRipenessError::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, content)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::RipenessLabel;

    #[test]
    fn minimal_file_uses_defaults() {
        let config = Config::from_toml_str(
            r#"
            input_path = "photos"
            output_base_dir = "out"
            "#,
        )
        .unwrap();

        assert_eq!(config.zoom_percent, 40);
        assert!(config.use_parallel);
        assert!(config.save_crops);
        assert_eq!(config.swatch_size, 100);
        assert_eq!(config.thresholds, ThresholdTable::default());
    }

    #[test]
    fn custom_threshold_table() {
        let config = Config::from_toml_str(
            r#"
            input_path = "photos"
            output_base_dir = "out"
            zoom_percent = 25

            [[thresholds]]
            label = "Unripe"
            ranges = [[90.0, 180.0]]

            [[thresholds]]
            label = "PartiallyRipe"
            ranges = [[50.0, 90.0]]

            [[thresholds]]
            label = "Ripe"
            ranges = [[40.0, 50.0]]

            [[thresholds]]
            label = "Overripe"
            ranges = [[0.0, 40.0], [330.0, 360.0]]
            "#,
        )
        .unwrap();

        assert!(config.validate_parameters().is_ok());
        assert_eq!(config.zoom_percent, 25);
        assert_eq!(config.thresholds.rules().len(), 4);
        assert_eq!(config.thresholds.classify(85.0), RipenessLabel::PartiallyRipe);
        assert_eq!(config.thresholds.classify(345.0), RipenessLabel::Overripe);
    }

    #[test]
    fn round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(Config::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn rejects_out_of_range_zoom() {
        let mut config = Config::default();
        config.zoom_percent = 5;
        assert!(matches!(
            config.validate_parameters(),
            Err(MangoRipenessError::InvalidZoom { zoom_percent: 5, .. })
        ));

        config.zoom_percent = 50;
        assert!(config.validate_parameters().is_ok());

        config.zoom_percent = 51;
        assert!(config.validate_parameters().is_err());
    }

    #[test]
    fn rejects_bad_swatch_and_thresholds() {
        let mut config = Config::default();
        config.swatch_size = 0;
        assert!(config.validate_parameters().is_err());

        let broken = Config::from_toml_str(
            r#"
            input_path = "photos"
            output_base_dir = "out"

            [[thresholds]]
            label = "Ripe"
            ranges = [[60.0, 40.0]]
            "#,
        )
        .unwrap();
        assert!(broken.validate_parameters().is_err());
    }

    #[test]
    fn unknown_label_fails_to_parse() {
        let result = Config::from_toml_str(
            r#"
            input_path = "photos"
            output_base_dir = "out"

            [[thresholds]]
            label = "Rotten"
            ranges = [[0.0, 10.0]]
            "#,
        );
        assert!(matches!(result, Err(MangoRipenessError::ConfigLoad { .. })));
    }
}
