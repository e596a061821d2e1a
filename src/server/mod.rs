//! HTTP server module
//!
//! Provides the Axum-based HTTP server for serving metrics.

pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{routing::get, Router};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::collector::{CollectorRegistry, StatusClient, Target};
use crate::config::Config;
use crate::exposition::ApacheDescs;
use crate::metrics::ExporterMetrics;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// Target scraped when a request names none
    pub default_target: Target,
    /// Collectors sharing the HTTP client and descriptors
    pub registry: Arc<CollectorRegistry>,
    /// Exporter self-metrics of the default target
    pub exporter_metrics: ExporterMetrics,
}

impl AppState {
    /// Build the process-wide state from a validated configuration
    pub fn new(config: Config) -> Result<Self> {
        let default_target = config.default_target()?;
        let client = StatusClient::new(config.fetch_policy())?;
        let descs = ApacheDescs::new(&config.metrics.namespace);

        Ok(Self {
            registry: Arc::new(CollectorRegistry::new(
                Arc::new(client),
                Arc::new(descs),
                default_target.clone(),
            )),
            exporter_metrics: ExporterMetrics::new(default_target.as_str()),
            default_target,
            config: Arc::new(config),
        })
    }
}

/// Build the router with all routes and middleware
pub fn router(state: AppState) -> Router {
    let metrics_path = state.config.server.path.clone();

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route(&metrics_path, get(handlers::metrics))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Parse the configured bind address
///
/// "localhost" maps to 127.0.0.1, anything else must be an IP address.
pub fn bind_addr(bind_address: &str, port: u16) -> Result<SocketAddr> {
    let ip: std::net::IpAddr = if bind_address == "localhost" {
        std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST)
    } else {
        bind_address
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind_address '{}': {}. Use an IP address (e.g., '0.0.0.0', '127.0.0.1') or 'localhost'.", bind_address, e))?
    };
    Ok(SocketAddr::from((ip, port)))
}

/// Run the HTTP server
///
/// # Errors
/// Returns an error if the state cannot be built or the server fails to start
pub async fn run(config: Config) -> Result<()> {
    let addr = bind_addr(&config.server.bind_address, config.server.port)?;
    let metrics_path = config.server.path.clone();

    let state = AppState::new(config)?;
    info!(
        address = %addr,
        metrics_path = %metrics_path,
        default_target = %state.default_target,
        "Server listening"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_addr() {
        assert_eq!(
            bind_addr("localhost", 9117).unwrap(),
            "127.0.0.1:9117".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            bind_addr("::1", 9117).unwrap(),
            "[::1]:9117".parse::<SocketAddr>().unwrap()
        );
        assert!(bind_addr("not-an-ip", 9117).is_err());
    }

    #[test]
    fn test_state_from_default_config() {
        let state = AppState::new(Config::default()).unwrap();
        assert_eq!(
            state.default_target.as_str(),
            "http://localhost/server-status?auto"
        );
        assert!(state.registry.is_default(&state.default_target));
        assert_eq!(state.exporter_metrics.stats().scrapes_total.get(), 0);
    }
}
