//! Configuration file handling.

use crate::capture::CaptureConfig;
use crate::client::ServiceConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Width or height is zero.
    #[error("invalid frame dimensions")]
    InvalidDimensions,
    /// JPEG quality outside 1-100.
    #[error("invalid jpeg quality {0} (must be 1-100)")]
    InvalidQuality(u8),
    /// Base URL does not parse or is not http(s).
    #[error("invalid service base url: {0}")]
    InvalidBaseUrl(String),
    /// Timeout of zero seconds.
    #[error("invalid request timeout (must be at least 1 second)")]
    InvalidTimeout,
    /// Config file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// Config file is not valid TOML for this schema.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// `[capture]` section.
    #[serde(default)]
    pub capture: CaptureConfig,
    /// `[service]` section.
    #[serde(default)]
    pub service: ServiceConfig,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.capture.validate()?;
        self.service.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = FileConfig::from_toml("").unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = FileConfig::from_toml(
            r#"
            [capture]
            width = 640
            height = 480

            [service]
            base_url = "https://auth.example.com"
            "#,
        )
        .unwrap();

        assert_eq!(config.capture.width, 640);
        assert_eq!(config.capture.jpeg_quality, 90);
        assert_eq!(config.service.base_url, "https://auth.example.com");
        assert_eq!(config.service.timeout_secs, 30);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            FileConfig::from_toml("[capture]\nheight = 0\n"),
            Err(ConfigError::InvalidDimensions)
        ));
        assert!(matches!(
            FileConfig::from_toml("[service]\nbase_url = \"nope\"\n"),
            Err(ConfigError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            FileConfig::from_toml("[capture\n"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            FileConfig::from_file("/nonexistent/face-auth.toml"),
            Err(ConfigError::FileReadError(_))
        ));
    }
}
