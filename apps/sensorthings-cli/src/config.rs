//! Configuration management for the sensor-things CLI
//!
//! Settings are layered: built-in defaults, the `config.json` in the
//! platform configuration directory, an explicit `--config` file, the
//! `SENSORTHINGS_*` environment variables, then command-line flags.

use crate::cli::GlobalArgs;
use crate::error::{CliError, CliResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_DESTINATION: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_CONFIG_DIR: &str = "SENSORTHINGS_CONFIG_DIR";
pub const ENV_URL: &str = "SENSORTHINGS_URL";
pub const ENV_TIMEOUT_SECS: &str = "SENSORTHINGS_TIMEOUT_SECS";

/// Configuration paths for the sensor-things CLI
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Base configuration directory
    pub config_dir: PathBuf,
    /// Path to config.json
    pub config_file: PathBuf,
}

impl ConfigPaths {
    /// Get configuration paths for the current platform
    ///
    /// Paths:
    /// - Linux: ~/.config/sensor-things/
    /// - macOS: ~/Library/Application Support/sensor-things/
    /// - Windows: %APPDATA%\sensor-things\
    pub fn new() -> CliResult<Self> {
        let config_dir = match std::env::var(ENV_CONFIG_DIR) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => dirs::config_dir()
                .ok_or_else(|| {
                    CliError::Config("Could not determine configuration directory".to_string())
                })?
                .join("sensor-things"),
        };
        Ok(Self::in_dir(config_dir))
    }

    pub fn in_dir(config_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        Self {
            config_file: config_dir.join("config.json"),
            config_dir,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the SensorThings server, without the version suffix
    pub destination: String,
    pub timeout_secs: u64,
    /// Pass budget for `yaml` reconciliation
    pub max_passes: usize,
    /// Retrieve every collection on startup
    pub refresh: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            destination: DEFAULT_DESTINATION.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_passes: sensorthings_client::reconciler::DEFAULT_MAX_PASSES,
            refresh: false,
        }
    }
}

impl Config {
    /// Load from the default location; a missing file yields the defaults.
    pub fn load(paths: &ConfigPaths) -> CliResult<Self> {
        if paths.config_file.exists() {
            Self::load_file(&paths.config_file)
        } else {
            Ok(Self::default())
        }
    }

    /// Load an explicit configuration file, which must exist.
    pub fn load_file(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| CliError::Config(format!("Invalid config file {}: {}", path.display(), e)))
    }

    /// Apply environment overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> CliResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_URL) {
            self.destination = url;
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = timeout.parse().map_err(|_| {
                CliError::Config(format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds, got '{timeout}'"))
            })?;
        }
        Ok(())
    }

    /// Apply command-line flags, which take precedence over everything else.
    pub fn apply_args(&mut self, args: &GlobalArgs) {
        if let Some(ref destination) = args.destination {
            self.destination = destination.clone();
        }
        if let Some(timeout) = args.timeout {
            self.timeout_secs = timeout;
        }
        if args.refresh {
            self.refresh = true;
        }
    }

    /// Resolve the effective configuration for this invocation.
    pub fn resolve(args: &GlobalArgs) -> CliResult<Self> {
        let mut config = match args.config {
            Some(ref path) => Self::load_file(path)?,
            None => Self::load(&ConfigPaths::new()?)?,
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CliResult<()> {
        if !(self.destination.starts_with("http://") || self.destination.starts_with("https://")) {
            return Err(CliError::Config(format!(
                "Destination must be an http(s) URL, got '{}'",
                self.destination
            )));
        }
        if self.timeout_secs == 0 {
            return Err(CliError::Config("Timeout must be at least 1 second".to_string()));
        }
        if self.max_passes == 0 {
            return Err(CliError::Config("max_passes must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.destination, "http://localhost:8080");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_passes, 3);
        assert!(!config.refresh);
    }

    #[test]
    fn test_missing_default_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&ConfigPaths::in_dir(dir.path())).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ConfigPaths::in_dir(dir.path());
        std::fs::write(&paths.config_file, r#"{ "destination": "http://sta:8080" }"#).unwrap();

        let config = Config::load(&paths).unwrap();
        assert_eq!(config.destination, "http://sta:8080");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                (ENV_URL, "http://from-env:8080"),
                (ENV_TIMEOUT_SECS, "5"),
            ]))
            .unwrap();
        assert_eq!(config.destination, "http://from-env:8080");
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_env_timeout() {
        let mut config = Config::default();
        let err = config.apply_env(env(&[(ENV_TIMEOUT_SECS, "soon")])).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn test_flags_override_env() {
        let mut config = Config::default();
        config.apply_env(env(&[(ENV_URL, "http://from-env:8080")])).unwrap();
        config.apply_args(&GlobalArgs {
            destination: Some("http://from-flag:8080".to_string()),
            refresh: true,
            ..Default::default()
        });
        assert_eq!(config.destination, "http://from-flag:8080");
        assert!(config.refresh);
    }

    #[test]
    fn test_validate_rejects_non_http_destination() {
        let config = Config {
            destination: "localhost:8080".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
