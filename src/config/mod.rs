//! Configuration management for brook.
//!
//! Configuration is read from `~/.config/brook/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.
//! The file also remembers which user is logged in.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
    pub fetch: FetchConfig,
    pub aggregation: AggregationConfig,

    /// Where this config was loaded from; `save` writes back there.
    #[serde(skip)]
    path: Option<PathBuf>,
}

/// HTTP settings for feed retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Upper bound for a single fetch, in seconds
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Default tick interval for `brook agg` (e.g. "30s", "1m", "1h")
    pub interval: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            current_user: None,
            db_path: None,
            fetch: FetchConfig::default(),
            aggregation: AggregationConfig::default(),
            path: None,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: concat!("brook/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            interval: "1m".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            Self::create_default_config(path)?;
            return Ok(Self {
                path: Some(path.to_path_buf()),
                ..Self::default()
            });
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Write the configuration back to where it was loaded from.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = match &self.path {
            Some(p) => p.clone(),
            None => Self::default_config_path()?,
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        fs::write(path, content).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Record `name` as the logged-in user and persist it.
    pub fn set_user(&mut self, name: &str) -> Result<(), ConfigError> {
        self.current_user = Some(name.to_string());
        self.save()
    }

    /// Get the default config file path: `~/.config/brook/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("brook").join("config.toml"))
    }

    /// The configured database path, or `<data dir>/brook/brook.db`.
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.db_path {
            return Ok(path.clone());
        }

        let data_dir = dirs::data_dir().ok_or(ConfigError::NoDataDir)?;
        let brook_dir = data_dir.join("brook");
        fs::create_dir_all(&brook_dir).map_err(|e| ConfigError::Io {
            path: brook_dir.clone(),
            source: e,
        })?;
        Ok(brook_dir.join("brook.db"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        fs::write(path, Self::default_config_content()).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn default_config_content() -> String {
        format!(
            r##"# brook configuration
#
# current_user is managed by `brook register` and `brook login`.
# Uncomment db_path to keep the database somewhere other than the
# platform data directory.
# db_path = "/var/lib/brook/brook.db"

[fetch]
# Upper bound for a single feed download, in seconds
timeout_secs = 10
user_agent = "brook/{}"

[aggregation]
# Used by `brook agg` when no interval is given
interval = "1m"
"##,
            env!("CARGO_PKG_VERSION")
        )
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Could not determine data directory")]
    NoDataDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config: Config =
            toml::from_str(&content).expect("Default config should be valid TOML");

        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
current_user = "alice"

[fetch]
timeout_secs = 3
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.current_user.as_deref(), Some("alice"));
        assert_eq!(config.fetch.timeout_secs, 3);
        // Default value
        assert_eq!(config.fetch.user_agent, FetchConfig::default().user_agent);
        assert_eq!(config.aggregation.interval, "1m");
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert!(config.current_user.is_none());
    }

    #[test]
    fn test_set_user_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::load_from(&path).unwrap();
        config.set_user("bob").unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.current_user.as_deref(), Some("bob"));
        assert_eq!(reloaded.fetch, FetchConfig::default());
    }

    #[test]
    fn test_invalid_config_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "current_user = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_explicit_db_path_wins() {
        let config = Config {
            db_path: Some(PathBuf::from("/tmp/custom.db")),
            ..Config::default()
        };
        assert_eq!(
            config.database_path().unwrap(),
            PathBuf::from("/tmp/custom.db")
        );
    }
}
