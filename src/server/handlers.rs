//! HTTP request handlers
//!
//! Contains handlers for all HTTP endpoints.

use std::time::{Duration, Instant};

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse},
    Json,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::AppState;
use crate::collector::Target;
use crate::error::{AppError, AppResult};
use crate::exposition::{formatter, MetricSample, PrometheusFormatter};

/// Header Prometheus sends with its own scrape deadline
pub const SCRAPE_TIMEOUT_HEADER: &str = "X-Prometheus-Scrape-Timeout-Seconds";

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    /// Health status
    status: String,
    /// Application version
    version: String,
}

/// Query parameters of the metrics endpoint
#[derive(Debug, Default, Deserialize)]
pub struct MetricsQuery {
    /// Target URI; empty means the default, `false` disables the scrape
    pub target: Option<String>,
    /// `false` leaves out the exporter's own metrics
    pub runtime: Option<String>,
}

/// Root endpoint - landing page with example links and the exported families
pub async fn root(State(state): State<AppState>) -> Html<String> {
    let path = &state.config.server.path;

    let families: String = state
        .registry
        .default_collector()
        .describe()
        .into_iter()
        .map(|desc| {
            let label = desc
                .variable_label()
                .map(|l| format!("{{{}}}", l))
                .unwrap_or_default();
            format!(
                "        <tr><td><code>{}{}</code></td><td>{}</td><td>{}</td></tr>\n",
                desc.name(),
                label,
                desc.metric_type(),
                desc.help()
            )
        })
        .collect();

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Apache Exporter</title>
</head>
<body>
    <h1>Apache Exporter</h1>
    <p>Version: {version}</p>
    <ul>
        <li><a href="{path}">Runtime metrics with default scrape</a></li>
        <li><a href="{path}?runtime=false&target=http%3A%2F%2Flocalhost%2Fserver-status%3Fauto">Only http://localhost/server-status?auto</a></li>
        <li><a href="{path}?target=false">Runtime metrics without scrape</a></li>
        <li><a href="/health">Health Check</a></li>
    </ul>
    <h2>Exported metrics</h2>
    <table>
        <tr><th>Name</th><th>Type</th><th>Help</th></tr>
{families}    </table>
</body>
</html>"#,
        version = env!("CARGO_PKG_VERSION"),
        path = path,
        families = families,
    );
    Html(html)
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Resolve the `target` query parameter
///
/// `None` means the scrape is disabled for this request.
pub fn resolve_target(default: &Target, requested: Option<&str>) -> AppResult<Option<Target>> {
    match requested.map(str::trim) {
        None | Some("") => Ok(Some(default.clone())),
        Some("false") => Ok(None),
        Some(uri) => Target::parse(uri)
            .map(Some)
            .map_err(|e| AppError::BadTarget(e.to_string())),
    }
}

/// Scrape deadline announced by the caller, if any
pub fn scrape_deadline(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(SCRAPE_TIMEOUT_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|secs| *secs > 0.0)
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
}

/// Metrics endpoint - scrapes the target and returns Prometheus format
///
/// Always answers 200 with a well-formed body once the target resolved;
/// scrape failures show up as `up` and the failure counter.
#[instrument(skip(state, headers), name = "metrics_handler")]
pub async fn metrics(
    State(state): State<AppState>,
    Query(query): Query<MetricsQuery>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let start = Instant::now();
    let mut samples: Vec<MetricSample> = Vec::new();

    if let Some(target) = resolve_target(&state.default_target, query.target.as_deref())? {
        let cancel = CancellationToken::new();
        let _guard = cancel.clone().drop_guard();

        if let Some(deadline) = scrape_deadline(&headers) {
            let token = cancel.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = token.cancelled() => {}
                    _ = tokio::time::sleep(deadline) => {
                        debug!(deadline_ms = deadline.as_millis() as u64, "Scrape deadline reached");
                        token.cancel();
                    }
                }
            });
        }

        let collector = state.registry.collector(&target);
        let scrape_start = Instant::now();
        // failures are logged and counted inside the collector
        let _ = collector.collect(&mut samples, &cancel).await;
        if state.registry.is_default(&target) {
            state
                .exporter_metrics
                .record_scrape(scrape_start.elapsed().as_secs_f64());
        }
    }

    if query.runtime.as_deref() != Some("false") {
        samples.extend(state.exporter_metrics.samples());
    }

    let output = PrometheusFormatter::new().format(&samples);

    debug!(
        duration_ms = start.elapsed().as_millis() as u64,
        samples = samples.len(),
        "Metrics collection complete"
    );

    Ok((
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, formatter::CONTENT_TYPE)],
        output,
    ))
}
