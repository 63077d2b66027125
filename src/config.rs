use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_listen")]
    pub listen: String,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    #[serde(default = "default_history_read_limit")]
    pub history_read_limit: usize,
    #[serde(default = "default_disk_path")]
    pub disk_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            interval_secs: default_interval_secs(),
            history_capacity: default_history_capacity(),
            history_read_limit: default_history_read_limit(),
            disk_path: default_disk_path(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse YAML in {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("config validation failed: {0}")]
    Validation(String),
}

impl Config {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let path_display = path_ref.display().to_string();
        let text = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
            path: path_display.clone(),
            source,
        })?;

        let cfg: Config = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path_display,
            source,
        })?;

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listen.trim().is_empty() {
            return Err(ConfigError::Validation("listen is required".to_string()));
        }
        if SocketAddr::from_str(&self.listen).is_err() {
            return Err(ConfigError::Validation(
                "listen must be a valid host:port address".to_string(),
            ));
        }
        if self.interval_secs < 1 {
            return Err(ConfigError::Validation(
                "interval_secs must be >= 1".to_string(),
            ));
        }
        if self.history_capacity < 1 {
            return Err(ConfigError::Validation(
                "history_capacity must be >= 1".to_string(),
            ));
        }
        if self.history_read_limit < 1 {
            return Err(ConfigError::Validation(
                "history_read_limit must be >= 1".to_string(),
            ));
        }
        if self.disk_path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "disk_path must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn example_yaml() -> &'static str {
        include_str!("../config.yaml.example")
    }
}

fn default_listen() -> String {
    "127.0.0.1:8080".to_string()
}

const fn default_interval_secs() -> u64 {
    5
}

const fn default_history_capacity() -> usize {
    1000
}

const fn default_history_read_limit() -> usize {
    100
}

fn default_disk_path() -> String {
    "/".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        Config::default().validate().expect("default config");
    }

    #[test]
    fn example_yaml_parses_and_validates() {
        let cfg: Config = serde_yaml::from_str(Config::example_yaml()).expect("parse example");
        cfg.validate().expect("validate example");
        assert_eq!(cfg.interval_secs, 5);
        assert_eq!(cfg.history_capacity, 1000);
        assert_eq!(cfg.history_read_limit, 100);
    }

    #[test]
    fn rejects_bad_listen_address() {
        let mut cfg = Config::default();
        cfg.listen = "not-an-address".to_string();
        assert!(matches!(cfg.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn rejects_zero_capacity_interval_and_limit() {
        let mut cfg = Config::default();
        cfg.history_capacity = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.interval_secs = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.history_read_limit = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_empty_disk_path() {
        let mut cfg = Config::default();
        cfg.disk_path = "  ".to_string();
        assert!(cfg.validate().is_err());
    }
}
