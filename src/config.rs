//! Configuration management for apache-exporter
//!
//! Handles loading and validating configuration from YAML files and
//! applying command-line overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::cli::Cli;
use crate::collector::{FetchPolicy, Target};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error reading the configuration file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Error parsing the configuration file
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation error
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Scrape target configuration
    #[serde(default)]
    pub apache: ApacheConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Metric naming
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Scrape target configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApacheConfig {
    /// Default status page URI, used when a request names no target
    #[serde(default = "default_scrape_uri")]
    pub scrape_uri: String,

    /// Skip TLS certificate verification for https targets
    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Metrics endpoint path
    #[serde(default = "default_metrics_path")]
    pub path: String,

    /// Server bind address
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

/// Metric naming configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Prefix of every exported metric name
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

// Default value functions
fn default_scrape_uri() -> String {
    "http://localhost/server-status?auto".to_string()
}

fn default_timeout() -> u64 {
    crate::collector::FetchPolicy::default().timeout_ms
}

fn default_port() -> u16 {
    9117
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_namespace() -> String {
    crate::exposition::metric::DEFAULT_NAMESPACE.to_string()
}

impl Default for ApacheConfig {
    fn default() -> Self {
        Self {
            scrape_uri: default_scrape_uri(),
            insecure: false,
            timeout_ms: default_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            path: default_metrics_path(),
            bind_address: default_bind_address(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    /// Use `Config::load_or_default()` to fall back to defaults for a missing file.
    /// The result is not validated; call `validate()` once overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a YAML file, falling back to defaults if not found
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        Self::load(path)
    }

    /// Apply command-line (and environment) overrides
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(ref bind_address) = cli.bind_address {
            self.server.bind_address = bind_address.clone();
        }
        if let Some(ref path) = cli.metrics_path {
            self.server.path = path.clone();
        }
        if let Some(ref scrape_uri) = cli.scrape_uri {
            self.apache.scrape_uri = scrape_uri.clone();
        }
        if let Some(timeout_ms) = cli.timeout_ms {
            self.apache.timeout_ms = timeout_ms;
        }
        if cli.insecure {
            self.apache.insecure = true;
        }
        if let Some(ref namespace) = cli.namespace {
            self.metrics.namespace = namespace.clone();
        }
    }

    /// Fetch policy derived from the scrape settings
    pub fn fetch_policy(&self) -> FetchPolicy {
        FetchPolicy {
            insecure: self.apache.insecure,
            timeout_ms: self.apache.timeout_ms,
        }
    }

    /// Default scrape target
    pub fn default_target(&self) -> Result<Target, ConfigError> {
        Target::parse(&self.apache.scrape_uri)
            .map_err(|e| ConfigError::ValidationError(e.to_string()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if !self.server.path.starts_with('/') {
            return Err(ConfigError::ValidationError(
                "Metrics path must start with '/'".to_string(),
            ));
        }

        if self.server.path == "/" || self.server.path == "/health" {
            return Err(ConfigError::ValidationError(format!(
                "Metrics path '{}' conflicts with a built-in route",
                self.server.path
            )));
        }

        if self.apache.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "Scrape timeout must be greater than 0".to_string(),
            ));
        }

        self.default_target()?;

        if !is_valid_namespace(&self.metrics.namespace) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid metric namespace '{}'",
                self.metrics.namespace
            )));
        }

        Ok(())
    }
}

/// `[a-zA-Z_][a-zA-Z0-9_]*`
fn is_valid_namespace(namespace: &str) -> bool {
    let mut chars = namespace.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
