//! Configuration loading and typed config structures for the engine.
//!
//! The canonical configuration lives in `headcount-config.yaml` next to
//! the binary. This module defines strongly-typed structs that mirror the
//! YAML structure, and provides a loader that reads the file and applies
//! environment overrides.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level service configuration.
///
/// Mirrors the structure of `headcount-config.yaml`. All fields have
/// defaults suitable for a local docker-compose setup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServiceConfig {
    /// Observer API settings.
    #[serde(default)]
    pub observer: ObserverConfig,

    /// Infrastructure connection strings.
    #[serde(default)]
    pub infrastructure: InfrastructureConfig,

    /// Store backend selection and rebuild behavior.
    #[serde(default)]
    pub store: StoreConfig,

    /// Upload blob storage settings.
    #[serde(default)]
    pub uploads: UploadsConfig,
}

impl ServiceConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for infrastructure URLs:
    /// - `NATS_URL` overrides `infrastructure.nats_url`
    /// - `DRAGONFLY_URL` overrides `infrastructure.dragonfly_url`
    /// - `DATABASE_URL` overrides `infrastructure.postgres_url`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.infrastructure.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.infrastructure.apply_env_overrides();
        Ok(config)
    }
}

/// Observer API configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObserverConfig {
    /// TCP port the observer server listens on.
    #[serde(default = "default_observer_port")]
    pub port: u16,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            port: default_observer_port(),
        }
    }
}

/// Infrastructure connection strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InfrastructureConfig {
    /// NATS server URL for change events.
    #[serde(default = "default_nats_url")]
    pub nats_url: String,

    /// `Dragonfly` (Redis-compatible) URL for the hot state.
    #[serde(default = "default_dragonfly_url")]
    pub dragonfly_url: String,

    /// `PostgreSQL` URL for the response archive. The archive (and the
    /// rebuild path) is disabled when unset.
    #[serde(default)]
    pub postgres_url: Option<String>,
}

impl InfrastructureConfig {
    /// Apply environment variable overrides to the connection URLs.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("NATS_URL") {
            self.nats_url = url;
        }
        if let Ok(url) = std::env::var("DRAGONFLY_URL") {
            self.dragonfly_url = url;
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.postgres_url = Some(url);
        }
    }
}

impl Default for InfrastructureConfig {
    fn default() -> Self {
        Self {
            nats_url: default_nats_url(),
            dragonfly_url: default_dragonfly_url(),
            postgres_url: None,
        }
    }
}

/// Which backend holds the hot documents and the aggregate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// `Dragonfly` (Redis-compatible) hot state, the production setup.
    #[default]
    Dragonfly,
    /// In-process memory store, for development without Docker.
    Memory,
}

/// Store backend configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Backend selection.
    #[serde(default)]
    pub backend: StoreBackend,

    /// Rebuild the aggregate from the archive during startup. Requires
    /// `infrastructure.postgres_url`.
    #[serde(default)]
    pub rebuild_on_start: bool,
}

/// Upload blob storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadsConfig {
    /// Root directory upload objects live under.
    #[serde(default = "default_blob_root")]
    pub blob_root: String,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            blob_root: default_blob_root(),
        }
    }
}

fn default_observer_port() -> u16 {
    8080
}

fn default_nats_url() -> String {
    String::from("nats://localhost:4222")
}

fn default_dragonfly_url() -> String {
    String::from("redis://localhost:6379")
}

fn default_blob_root() -> String {
    String::from("./uploads")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config = ServiceConfig::parse("{}").unwrap_or_default();
        assert_eq!(config.observer.port, 8080);
        assert_eq!(config.store.backend, StoreBackend::Dragonfly);
        assert!(!config.store.rebuild_on_start);
    }

    #[test]
    fn partial_yaml_fills_the_rest() {
        let yaml = r"
observer:
  port: 9999
store:
  backend: memory
  rebuild_on_start: true
";
        let config = ServiceConfig::parse(yaml).unwrap_or_default();
        assert_eq!(config.observer.port, 9999);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert!(config.store.rebuild_on_start);
        // Untouched sections keep their defaults.
        assert_eq!(config.uploads.blob_root, "./uploads");
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let result = ServiceConfig::parse(": not yaml :");
        assert!(result.is_err());
    }
}
