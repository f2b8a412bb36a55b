//! Configuration loading and typed config structures for the service.
//!
//! The canonical configuration lives in `rendezvous-config.yaml` at the
//! project root. Every section and every field has a default, so an empty
//! file (or no file at all) yields a working configuration. A handful of
//! environment variables override the file after it is parsed.

use std::path::{Path, PathBuf};

use rendezvous_store::{DEFAULT_CHANNEL_CAPACITY, IdStrategy};
use serde::Deserialize;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "rendezvous-config.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The config file contains invalid YAML or unexpected values.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override could not be parsed.
    #[error("invalid value for {name}: {value:?} ({reason})")]
    InvalidOverride {
        /// The environment variable name.
        name: &'static str,
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration matching `rendezvous-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServiceConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Store initialisation settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Notification bus settings.
    #[serde(default)]
    pub notifications: NotificationsConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Load configuration from a YAML file and apply environment overrides.
    ///
    /// Environment variables override YAML values:
    /// - `RENDEZVOUS_HOST` overrides `server.host`
    /// - `RENDEZVOUS_PORT` overrides `server.port`
    /// - `RENDEZVOUS_SEED_PATH` overrides `store.seed_path`
    /// - `RUST_LOG` overrides `logging.level`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if it is not valid, or
    /// [`ConfigError::InvalidOverride`] if an override is malformed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise start from the defaults. Either
    /// way environment overrides are applied.
    ///
    /// # Errors
    ///
    /// Same as [`ServiceConfig::from_file`].
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::from_file(path);
        }
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string without consulting the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml maps an empty document to unit, not to an empty map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOverride`] if `RENDEZVOUS_PORT` is not
    /// a port number.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOverride`] if the port override is not
    /// a port number.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(host) = lookup("RENDEZVOUS_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("RENDEZVOUS_PORT") {
            self.server.port = match port.parse() {
                Ok(port) => port,
                Err(err) => {
                    return Err(ConfigError::InvalidOverride {
                        name: "RENDEZVOUS_PORT",
                        reason: format!("{err}"),
                        value: port,
                    });
                }
            };
        }
        if let Some(path) = lookup("RENDEZVOUS_SEED_PATH") {
            self.store.seed_path = (!path.is_empty()).then(|| PathBuf::from(path));
        }
        if let Some(level) = lookup("RUST_LOG") {
            self.logging.level = level;
        }
        Ok(())
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// The host address to bind to (e.g. `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: String,

    /// The TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Store initialisation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// JSON dataset loaded once at startup. No seed means empty collections.
    #[serde(default)]
    pub seed_path: Option<PathBuf>,

    /// How new record identifiers are generated.
    #[serde(default)]
    pub id_strategy: IdStrategy,
}

/// Notification bus settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NotificationsConfig {
    /// Payloads buffered per topic before a slow subscriber starts skipping.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Plain,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive (e.g. `info`, `rendezvous_store=debug`).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    4000
}

const fn default_channel_capacity() -> usize {
    DEFAULT_CHANNEL_CAPACITY
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn lookup_in(vars: &BTreeMap<&str, &str>) -> impl Fn(&str) -> Option<String> {
        |name: &str| vars.get(name).map(|value| (*value).to_owned())
    }

    #[test]
    fn defaults_cover_every_section() {
        let config = ServiceConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 4000);
        assert!(config.store.seed_path.is_none());
        assert_eq!(config.store.id_strategy, IdStrategy::Uuid);
        assert_eq!(config.notifications.channel_capacity, DEFAULT_CHANNEL_CAPACITY);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Plain);
    }

    #[test]
    fn empty_document_is_the_default() {
        assert_eq!(ServiceConfig::parse("").unwrap(), ServiceConfig::default());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
server:
  host: 127.0.0.1
  port: 8088
store:
  seed_path: data/seed.json
  id_strategy: sequential
notifications:
  channel_capacity: 16
logging:
  level: debug
  format: json
";
        let config = ServiceConfig::parse(yaml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.store.seed_path, Some(PathBuf::from("data/seed.json")));
        assert_eq!(config.store.id_strategy, IdStrategy::Sequential);
        assert_eq!(config.notifications.channel_capacity, 16);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn partial_sections_fill_in_defaults() {
        let config = ServiceConfig::parse("server:\n  port: 9000\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn unknown_id_strategy_is_rejected() {
        let err = ServiceConfig::parse("store:\n  id_strategy: random\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = ServiceConfig::default();
        let vars = BTreeMap::from([
            ("RENDEZVOUS_HOST", "127.0.0.1"),
            ("RENDEZVOUS_PORT", "5000"),
            ("RENDEZVOUS_SEED_PATH", "/tmp/seed.json"),
            ("RUST_LOG", "rendezvous_store=debug"),
        ]);
        config.apply_overrides(lookup_in(&vars)).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.store.seed_path, Some(PathBuf::from("/tmp/seed.json")));
        assert_eq!(config.logging.level, "rendezvous_store=debug");
    }

    #[test]
    fn malformed_port_override_is_an_error() {
        let mut config = ServiceConfig::default();
        let vars = BTreeMap::from([("RENDEZVOUS_PORT", "eighty")]);
        let err = config.apply_overrides(lookup_in(&vars)).unwrap_err();
        assert!(err.to_string().contains("RENDEZVOUS_PORT"));
    }
}
