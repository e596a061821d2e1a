//! CLI argument parsing for apache-exporter
//!
//! This module provides the command-line interface using clap derive macros.
//!
//! # Options
//!
//! - `--config` / `-c`: Configuration file path (default: config.yaml, env: APACHE_EXPORTER_CONFIG)
//! - `--port` / `-p`: Server port (env: APACHE_EXPORTER_PORT)
//! - `--bind-address`: Server bind address (env: APACHE_EXPORTER_BIND_ADDRESS)
//! - `--metrics-path`: Metrics endpoint path (env: APACHE_EXPORTER_METRICS_PATH)
//! - `--scrape-uri`: Default status page URI (env: APACHE_EXPORTER_SCRAPE_URI)
//! - `--timeout-ms`: Scrape timeout in milliseconds (env: APACHE_EXPORTER_TIMEOUT_MS)
//! - `--insecure`: Skip TLS certificate verification (env: APACHE_EXPORTER_INSECURE)
//! - `--namespace`: Metric name prefix (env: APACHE_EXPORTER_NAMESPACE)
//! - `--validate`: Validate configuration without starting server
//! - `--log-level` / `-l`: Log level (trace/debug/info/warn/error, env: APACHE_EXPORTER_LOG_LEVEL)
//! - `--log-format`: Log output format (text/json, env: APACHE_EXPORTER_LOG_FORMAT)
//! - `--output-format`: Output format for --validate (text/json/yaml)
//!
//! # Precedence
//!
//! 1. CLI arguments
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// apache-exporter - Prometheus exporter for Apache httpd
///
/// Scrapes the machine-readable mod_status page (server-status?auto)
/// and exports it in Prometheus format.
#[derive(Parser, Debug)]
#[command(name = "apache-exporter")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config.yaml",
        env = "APACHE_EXPORTER_CONFIG"
    )]
    pub config: PathBuf,

    /// Server port (overrides config file)
    #[arg(short, long, value_name = "PORT", env = "APACHE_EXPORTER_PORT")]
    pub port: Option<u16>,

    /// Server bind address (overrides config file)
    /// Supported values: IP addresses (0.0.0.0, 127.0.0.1, ::1) or "localhost"
    #[arg(long, value_name = "ADDRESS", env = "APACHE_EXPORTER_BIND_ADDRESS")]
    pub bind_address: Option<String>,

    /// Metrics endpoint path (overrides config file)
    #[arg(long, value_name = "PATH", env = "APACHE_EXPORTER_METRICS_PATH")]
    pub metrics_path: Option<String>,

    /// Default status page URI (overrides config file)
    #[arg(long, value_name = "URI", env = "APACHE_EXPORTER_SCRAPE_URI")]
    pub scrape_uri: Option<String>,

    /// Scrape timeout in milliseconds (overrides config file)
    #[arg(long, value_name = "MS", env = "APACHE_EXPORTER_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Ignore server certificate errors when scraping https targets
    #[arg(long, env = "APACHE_EXPORTER_INSECURE")]
    pub insecure: bool,

    /// Metric name prefix (overrides config file)
    #[arg(long, value_name = "NAMESPACE", env = "APACHE_EXPORTER_NAMESPACE")]
    pub namespace: Option<String>,

    /// Validate configuration without starting server
    #[arg(long)]
    pub validate: bool,

    /// Log level
    #[arg(
        short,
        long,
        value_enum,
        default_value = "info",
        env = "APACHE_EXPORTER_LOG_LEVEL"
    )]
    pub log_level: LogLevel,

    /// Log output format
    #[arg(long, value_enum, default_value = "text", env = "APACHE_EXPORTER_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Output format for --validate
    #[arg(long, value_enum, default_value = "text")]
    pub output_format: OutputFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Log output format
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per event
    Json,
}

/// Output format options for validate mode
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}
