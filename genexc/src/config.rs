//! Registry configuration
//!
//! Loaded from TOML; every section and key is optional.
//!
//! ```toml
//! [dispatch]
//! implicit_conversions = true
//!
//! [catalog]
//! seed = 42
//!
//! [output]
//! format = "json"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors loading or writing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dispatch: DispatchConfig,
    pub catalog: CatalogConfig,
    pub output: OutputConfig,
}

/// Lookup behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Apply registered conversions when no exact overload exists. When
    /// false only exact signatures resolve.
    pub implicit_conversions: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self { implicit_conversions: true }
    }
}

/// Built-in catalog options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Seed for the random-sampling functions. Unseeded runs draw from OS
    /// entropy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// CLI output options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

/// Listing format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Config {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
        assert!(Config::default().dispatch.implicit_conversions);
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml_str("[catalog]\nseed = 7\n").unwrap();
        assert_eq!(config.catalog.seed, Some(7));
        assert!(config.dispatch.implicit_conversions);
        assert_eq!(config.output.format, OutputFormat::Text);
    }

    #[test]
    fn test_round_trip_defaults() {
        let text = Config::default().to_toml().unwrap();
        assert!(text.contains("implicit_conversions = true"));
        assert_eq!(Config::from_toml_str(&text).unwrap(), Config::default());
    }

    #[test]
    fn test_unknown_format_rejected() {
        let err = Config::from_toml_str("[output]\nformat = \"yaml\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
