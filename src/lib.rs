//! apache-exporter library
//!
//! This crate provides the core functionality for scraping the Apache httpd
//! mod_status page and exporting its values in Prometheus format.

pub mod cli;
pub mod collector;
pub mod config;
pub mod error;
pub mod exposition;
pub mod metrics;
pub mod server;

use anyhow::Result;
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use cli::{LogFormat, LogLevel};

/// Initialize the logging subsystem
///
/// # Arguments
/// * `level` - Default log level; `RUST_LOG` takes precedence when set
/// * `format` - Plain text or JSON lines, written to stderr
///
/// # Errors
/// Returns an error if the logging system fails to initialize
pub fn init_logging(level: LogLevel, format: LogFormat) -> Result<()> {
    let default_level = LevelFilter::from_level(tracing::Level::from(level));
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(default_level.into()));
    let registry = tracing_subscriber::registry().with(filter);

    let result = match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
