//! Configuration File Loading
//!
//! Finds and loads configuration files from conventional locations, with
//! TOML and JSON support selected by file extension. Missing files fall
//! back to defaults; malformed files are errors.

use super::Config;
use crate::error::{Error, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Determine format from a file extension
    fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Some(ConfigFormat::Toml),
            Some("json") => Some(ConfigFormat::Json),
            _ => None,
        }
    }
}

/// Configuration file loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration, falling back to defaults if no file is found.
    ///
    /// Search order: `$PRINTQUEST_CONFIG`, `./printquest.toml`, then
    /// `printquest/config.toml` under the platform config directory.
    pub fn load() -> Result<Config> {
        for path in Self::search_paths() {
            if path.is_file() {
                debug!("loading configuration from {}", path.display());
                return Self::load_from(&path);
            }
        }
        debug!("no configuration file found, using defaults");
        Ok(Config::default())
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Config> {
        let contents = fs::read_to_string(path).map_err(|e| Error::ConfigLoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let format = ConfigFormat::from_path(path).ok_or_else(|| Error::ConfigParseFailed {
            format: "unknown".to_string(),
            reason: format!("unrecognized extension on '{}'", path.display()),
        })?;

        let config: Config = match format {
            ConfigFormat::Toml => toml::from_str(&contents)?,
            ConfigFormat::Json => serde_json::from_str(&contents)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Candidate configuration file locations, in priority order
    fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(path) = env::var("PRINTQUEST_CONFIG") {
            paths.push(PathBuf::from(path));
        }

        paths.push(PathBuf::from("printquest.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("printquest").join("config.toml"));
        }

        paths
    }
}
