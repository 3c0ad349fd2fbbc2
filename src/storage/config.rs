//! Configuration handling
//!
//! User configuration lives in `config.toml` under the platform config
//! directory (`~/.config/recipe-shelf/config.toml` on Linux). The
//! `SHELF_CONFIG` environment variable points at a different file.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::DisplayFormat;

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "SHELF_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse configuration {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Folder watching settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Quiet period before a burst of changes triggers a rescan
    pub debounce_millis: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_millis: 500,
        }
    }
}

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Recipe folder used when none is given on the command line
    pub library: Option<PathBuf>,

    /// How amounts are displayed and written
    pub amount_format: DisplayFormat,

    /// Default output format (text or json)
    pub output: OutputFormat,

    pub watch: WatchConfig,
}

impl Config {
    /// Loads configuration from the default location; a missing file
    /// yields the defaults
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Loads configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Location of the config file
    pub fn config_path() -> Option<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
            return Some(PathBuf::from(path));
        }
        ProjectDirs::from("dev", "recipe-shelf", "recipe-shelf")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Picks the recipe folder: explicit choice, then `library`, then the
    /// current directory
    pub fn resolve_library(&self, explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.library.clone())
            .or_else(|| env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.amount_format, DisplayFormat::Original);
        assert_eq!(config.output, OutputFormat::Text);
        assert_eq!(config.watch.debounce_millis, 500);
        assert!(config.library.is_none());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
library = "/home/cook/recipes"
amount_format = "fraction"

[watch]
debounce_millis = 250
"#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.library, Some(PathBuf::from("/home/cook/recipes")));
        assert_eq!(config.amount_format, DisplayFormat::Fraction);
        assert_eq!(config.output, OutputFormat::Text);
        assert_eq!(config.watch.debounce_millis, 250);
    }

    #[test]
    fn from_file_reports_parse_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "amount_format = \"roman\"\n").unwrap();

        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn explicit_folder_wins() {
        let config = Config {
            library: Some(PathBuf::from("/configured")),
            ..Config::default()
        };
        assert_eq!(
            config.resolve_library(Some(Path::new("/flag"))),
            PathBuf::from("/flag")
        );
        assert_eq!(config.resolve_library(None), PathBuf::from("/configured"));
    }
}
