//! apache-exporter - Prometheus exporter for Apache httpd
//!
//! This binary scrapes the mod_status page of an Apache server and serves
//! the values on a Prometheus-compatible metrics endpoint.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use apache_exporter::{
    cli::{Cli, OutputFormat},
    config::Config,
    server,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    apache_exporter::init_logging(cli.log_level, cli.log_format)?;

    let mut config = Config::load_or_default(&cli.config)?;
    config.apply_cli(&cli);
    config.validate()?;

    if cli.validate {
        print_config(&config, cli.output_format)?;
        return Ok(());
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        scrape_uri = %config.apache.scrape_uri,
        "Starting apache-exporter"
    );

    server::run(config).await?;

    Ok(())
}

/// Print the effective configuration for `--validate`
fn print_config(config: &Config, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!("Configuration is valid");
            println!("  scrape_uri:   {}", config.apache.scrape_uri);
            println!("  insecure:     {}", config.apache.insecure);
            println!("  timeout_ms:   {}", config.apache.timeout_ms);
            println!(
                "  listen:       {}:{}",
                config.server.bind_address, config.server.port
            );
            println!("  metrics_path: {}", config.server.path);
            println!("  namespace:    {}", config.metrics.namespace);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(config)?);
        }
    }
    Ok(())
}
