//! Service configuration loading
//!
//! Each setting resolves in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Levels 1 and 2 arrive together as [`ConfigOverrides`] (clap reads both).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::{Error, Result};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_EXPORT_FILENAME: &str = "Forbes_Design_Projects.csv";

/// Contents of config.toml; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub export_filename: Option<String>,
    /// CSV file imported once at startup
    pub seed_csv: Option<PathBuf>,
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub seed_csv: Option<PathBuf>,
    /// Explicit config file; when set it must exist and parse
    pub config_file: Option<PathBuf>,
}

/// Fully resolved service settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub export_filename: String,
    pub seed_csv: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            export_filename: DEFAULT_EXPORT_FILENAME.to_string(),
            seed_csv: None,
        }
    }
}

impl ServiceConfig {
    /// Resolve settings from overrides, the config file, then defaults
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self> {
        let file = match &overrides.config_file {
            Some(path) => load_toml_config(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => load_toml_config(&path)?,
                _ => TomlConfig::default(),
            },
        };
        Ok(Self::merge(overrides, file))
    }

    /// Layer overrides over file values over defaults
    pub fn merge(overrides: ConfigOverrides, file: TomlConfig) -> Self {
        let defaults = Self::default();
        Self {
            host: overrides.host.or(file.host).unwrap_or(defaults.host),
            port: overrides.port.or(file.port).unwrap_or(defaults.port),
            export_filename: file.export_filename.unwrap_or(defaults.export_filename),
            seed_csv: overrides.seed_csv.or(file.seed_csv),
        }
    }

    /// host:port for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Platform config file location: `<config_dir>/fdp/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("fdp").join("config.toml"))
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        warn!("Cannot read config file {}: {}", path.display(), e);
        Error::Config(format!("Cannot read {}: {}", path.display(), e))
    })?;
    let config = toml::from_str::<TomlConfig>(&content)
        .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_defaults() {
        let config = ServiceConfig::merge(ConfigOverrides::default(), TomlConfig::default());
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.bind_address(), "127.0.0.1:5000");
    }

    #[test]
    fn test_merge_priority() {
        let file = TomlConfig {
            host: Some("0.0.0.0".to_string()),
            port: Some(8080),
            export_filename: Some("projects.csv".to_string()),
            seed_csv: Some(PathBuf::from("/srv/file.csv")),
        };
        let overrides = ConfigOverrides {
            port: Some(9000),
            seed_csv: Some(PathBuf::from("/srv/cli.csv")),
            ..Default::default()
        };
        let config = ServiceConfig::merge(overrides, file);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.export_filename, "projects.csv");
        assert_eq!(config.seed_csv, Some(PathBuf::from("/srv/cli.csv")));
    }
}
