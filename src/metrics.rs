//! Exporter self-observability metrics
//!
//! Included in `/metrics` output unless the request passes `runtime=false`.
//!
//! # Metrics
//!
//! - `apache_exporter_build_info{version="..."}` - Constant 1, carries the version
//! - `apache_exporter_scrapes_total{target="..."}` - Counter of default-target scrape cycles
//! - `apache_exporter_scrape_duration_seconds{target="..."}` - Histogram of their durations

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::exposition::{MetricSample, MetricType};

/// Default histogram buckets for scrape duration (in seconds)
pub const DEFAULT_HISTOGRAM_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

const BUILD_INFO: &str = "apache_exporter_build_info";
const SCRAPES_TOTAL: &str = "apache_exporter_scrapes_total";
const SCRAPE_DURATION: &str = "apache_exporter_scrape_duration_seconds";

/// Thread-safe counter using atomic operations
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    /// Create a new counter initialized to 0
    pub fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
        }
    }

    /// Increment the counter by 1
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current value
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Thread-safe histogram for measuring distributions
#[derive(Debug)]
pub struct Histogram {
    /// Bucket upper bounds, sorted, ending with +Inf
    buckets: Vec<f64>,
    /// Cumulative count per bucket
    bucket_counts: Vec<AtomicU64>,
    /// Sum of all observed values, stored as f64 bits
    sum: AtomicU64,
    count: AtomicU64,
}

impl Histogram {
    /// Create a new histogram with the given bucket boundaries
    pub fn new(buckets: &[f64]) -> Self {
        let mut sorted_buckets: Vec<f64> = buckets.to_vec();
        sorted_buckets.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        if sorted_buckets
            .last()
            .map(|v| !v.is_infinite())
            .unwrap_or(true)
        {
            sorted_buckets.push(f64::INFINITY);
        }

        let bucket_counts = (0..sorted_buckets.len())
            .map(|_| AtomicU64::new(0))
            .collect();

        Self {
            buckets: sorted_buckets,
            bucket_counts,
            sum: AtomicU64::new(0.0_f64.to_bits()),
            count: AtomicU64::new(0),
        }
    }

    /// Create a histogram with default buckets for scrape durations
    pub fn with_default_buckets() -> Self {
        Self::new(DEFAULT_HISTOGRAM_BUCKETS)
    }

    /// Observe a value
    pub fn observe(&self, v: f64) {
        self.count.fetch_add(1, Ordering::Relaxed);

        loop {
            let current = self.sum.load(Ordering::Relaxed);
            let new = f64::from_bits(current) + v;
            if self
                .sum
                .compare_exchange_weak(current, new.to_bits(), Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
            {
                break;
            }
        }

        for (i, &bound) in self.buckets.iter().enumerate() {
            if v <= bound {
                self.bucket_counts[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Get the sum of all observations
    pub fn sum(&self) -> f64 {
        f64::from_bits(self.sum.load(Ordering::Relaxed))
    }

    /// Get the total count of observations
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Get bucket boundaries and their cumulative counts
    pub fn cumulative_buckets(&self) -> Vec<(f64, u64)> {
        self.buckets
            .iter()
            .zip(self.bucket_counts.iter())
            .map(|(&bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::with_default_buckets()
    }
}

/// Scrape statistics of the default target
#[derive(Debug, Default)]
pub struct TargetMetrics {
    pub scrapes_total: Counter,
    pub scrape_duration_seconds: Histogram,
}

/// Exporter self-metrics
///
/// Only the configured default target is tracked. Targets named by a request
/// are client-controlled and would add a label value per distinct URL.
#[derive(Debug, Clone)]
pub struct ExporterMetrics {
    target: Arc<str>,
    stats: Arc<TargetMetrics>,
}

impl ExporterMetrics {
    /// Create empty statistics for `target`
    pub fn new(target: &str) -> Self {
        Self {
            target: Arc::from(target),
            stats: Arc::new(TargetMetrics::default()),
        }
    }

    /// Statistics of the tracked target
    pub fn stats(&self) -> &TargetMetrics {
        &self.stats
    }

    /// Record one finished scrape cycle, successful or not
    pub fn record_scrape(&self, duration_seconds: f64) {
        self.stats.scrapes_total.inc();
        self.stats.scrape_duration_seconds.observe(duration_seconds);
    }

    /// Render all self-metrics as samples
    pub fn samples(&self) -> Vec<MetricSample> {
        let target: &str = &self.target;
        let mut samples = vec![
            MetricSample::new(BUILD_INFO, 1.0)
                .with_type(MetricType::Gauge)
                .with_help("A metric with a constant '1' value labeled by the exporter version")
                .with_label("version", env!("CARGO_PKG_VERSION")),
            MetricSample::new(SCRAPES_TOTAL, self.stats.scrapes_total.get() as f64)
                .with_type(MetricType::Counter)
                .with_help("Total number of scrape cycles of the default target")
                .with_label("target", target),
        ];

        let histogram = &self.stats.scrape_duration_seconds;
        for (bound, count) in histogram.cumulative_buckets() {
            let le = if bound.is_infinite() {
                "+Inf".to_string()
            } else {
                format!("{}", bound)
            };
            samples.push(
                MetricSample::new(format!("{}_bucket", SCRAPE_DURATION), count as f64)
                    .with_type(MetricType::Histogram)
                    .with_help("Duration of scrape cycles of the default target in seconds")
                    .with_label("target", target)
                    .with_label("le", le),
            );
        }
        samples.push(
            MetricSample::new(format!("{}_sum", SCRAPE_DURATION), histogram.sum())
                .with_type(MetricType::Histogram)
                .with_label("target", target),
        );
        samples.push(
            MetricSample::new(format!("{}_count", SCRAPE_DURATION), histogram.count() as f64)
                .with_type(MetricType::Histogram)
                .with_label("target", target),
        );

        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exposition::PrometheusFormatter;

    #[test]
    fn test_counter_operations() {
        let counter = Counter::new();
        assert_eq!(counter.get(), 0);
        counter.inc();
        counter.inc();
        assert_eq!(counter.get(), 2);
    }

    #[test]
    fn test_histogram_operations() {
        let histogram = Histogram::new(&[0.1, 0.5, 1.0]);

        histogram.observe(0.05);
        histogram.observe(0.3);
        histogram.observe(0.8);
        histogram.observe(2.0);

        assert_eq!(histogram.count(), 4);

        let buckets = histogram.cumulative_buckets();
        assert_eq!(buckets[0], (0.1, 1));
        assert_eq!(buckets[1], (0.5, 2));
        assert_eq!(buckets[2], (1.0, 3));
        assert_eq!(buckets[3].1, 4);
        assert!((histogram.sum() - 3.15).abs() < 1e-9);
    }

    #[test]
    fn test_histogram_default_buckets() {
        let histogram = Histogram::with_default_buckets();
        assert_eq!(
            histogram.cumulative_buckets().len(),
            DEFAULT_HISTOGRAM_BUCKETS.len() + 1
        );
    }

    const TARGET: &str = "http://localhost/server-status?auto";

    #[test]
    fn test_record_scrape() {
        let metrics = ExporterMetrics::new(TARGET);
        metrics.record_scrape(0.05);
        metrics.record_scrape(0.2);

        assert_eq!(metrics.stats().scrapes_total.get(), 2);
        assert_eq!(metrics.stats().scrape_duration_seconds.count(), 2);
    }

    #[test]
    fn test_clones_share_stats() {
        let metrics = ExporterMetrics::new(TARGET);
        metrics.clone().record_scrape(0.1);
        assert_eq!(metrics.stats().scrapes_total.get(), 1);
    }

    #[test]
    fn test_series_before_first_scrape() {
        let samples = ExporterMetrics::new(TARGET).samples();
        assert_eq!(samples[0].name, "apache_exporter_build_info");
        assert_eq!(samples[0].label("version"), Some(env!("CARGO_PKG_VERSION")));
        assert_eq!(samples[1].name, "apache_exporter_scrapes_total");
        assert_eq!(samples[1].value, 0.0);
        // build_info, scrapes_total, one sample per bucket incl. +Inf, sum, count
        assert_eq!(samples.len(), 2 + DEFAULT_HISTOGRAM_BUCKETS.len() + 1 + 2);
    }

    #[test]
    fn test_rendered_output() {
        let metrics = ExporterMetrics::new("http://web1/server-status?auto");
        metrics.record_scrape(0.02);

        let output = PrometheusFormatter::new().format(&metrics.samples());

        assert!(output.contains("# TYPE apache_exporter_scrape_duration_seconds histogram"));
        assert!(output.contains(
            "apache_exporter_scrape_duration_seconds_bucket{le=\"+Inf\",target=\"http://web1/server-status?auto\"} 1"
        ));
        assert!(output.contains(
            "apache_exporter_scrapes_total{target=\"http://web1/server-status?auto\"} 1"
        ));
    }
}
