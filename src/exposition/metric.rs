//! Metric descriptors and samples
//!
//! A [`Desc`] is the immutable identity of a metric family (name, help, type,
//! optional variable label). Descriptors are built once at startup and every
//! scrape cycle turns them into fresh [`MetricSample`]s.

use std::collections::BTreeMap;

/// Default metric namespace
pub const DEFAULT_NAMESPACE: &str = "apache";

/// Label used by every labeled gauge family
pub const STATE_LABEL: &str = "state";

/// Prometheus metric type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetricType {
    /// A value that can go up and down
    Gauge,
    /// A monotonically increasing value
    Counter,
    /// Observations counted in buckets
    Histogram,
    /// Type is not specified
    #[default]
    Untyped,
}

impl MetricType {
    /// Returns the Prometheus type string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Gauge => "gauge",
            MetricType::Counter => "counter",
            MetricType::Histogram => "histogram",
            MetricType::Untyped => "untyped",
        }
    }
}

impl std::fmt::Display for MetricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One metric value ready for exposition
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    /// Series name (for histograms this includes the `_bucket`/`_sum`/`_count` suffix)
    pub name: String,
    /// Help text of the family
    pub help: Option<String>,
    /// Metric type of the family
    pub metric_type: MetricType,
    /// Labels, kept sorted by name
    pub labels: BTreeMap<String, String>,
    /// Sample value
    pub value: f64,
}

impl MetricSample {
    /// Create an untyped sample without labels
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            help: None,
            metric_type: MetricType::Untyped,
            labels: BTreeMap::new(),
            value,
        }
    }

    /// Set the metric type
    pub fn with_type(mut self, metric_type: MetricType) -> Self {
        self.metric_type = metric_type;
        self
    }

    /// Set the help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Add a label
    pub fn with_label(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(name.into(), value.into());
        self
    }

    /// Look up a label value
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels.get(name).map(String::as_str)
    }

    /// Name of the family this sample belongs to
    ///
    /// Histogram series share one family: `foo_bucket`, `foo_sum` and
    /// `foo_count` all report `foo`.
    pub fn family(&self) -> &str {
        if self.metric_type == MetricType::Histogram {
            for suffix in ["_bucket", "_sum", "_count"] {
                if let Some(base) = self.name.strip_suffix(suffix) {
                    return base;
                }
            }
        }
        &self.name
    }
}

/// Destination for samples produced during a collection cycle
pub trait MetricSink {
    /// Accept one sample
    fn emit(&mut self, sample: MetricSample);
}

impl MetricSink for Vec<MetricSample> {
    fn emit(&mut self, sample: MetricSample) {
        self.push(sample);
    }
}

/// Immutable description of a metric family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Desc {
    name: String,
    help: &'static str,
    metric_type: MetricType,
    variable_label: Option<&'static str>,
}

impl Desc {
    /// Create a descriptor without a variable label
    pub fn new(
        namespace: &str,
        name: &str,
        help: &'static str,
        metric_type: MetricType,
    ) -> Self {
        Self {
            name: fq_name(namespace, name),
            help,
            metric_type,
            variable_label: None,
        }
    }

    /// Create a descriptor whose series are split by one variable label
    pub fn labeled(
        namespace: &str,
        name: &str,
        help: &'static str,
        metric_type: MetricType,
        label: &'static str,
    ) -> Self {
        Self {
            variable_label: Some(label),
            ..Self::new(namespace, name, help, metric_type)
        }
    }

    /// Fully-qualified metric name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Help text
    pub fn help(&self) -> &'static str {
        self.help
    }

    /// Metric type
    pub fn metric_type(&self) -> MetricType {
        self.metric_type
    }

    /// Name of the variable label, if any
    pub fn variable_label(&self) -> Option<&'static str> {
        self.variable_label
    }

    /// Build an unlabeled sample
    pub fn sample(&self, value: f64) -> MetricSample {
        MetricSample::new(self.name.clone(), value)
            .with_type(self.metric_type)
            .with_help(self.help)
    }

    /// Build a sample for one value of the variable label
    ///
    /// Descriptors without a variable label fall back to [`Desc::sample`].
    pub fn labeled_sample(&self, label_value: &str, value: f64) -> MetricSample {
        let sample = self.sample(value);
        match self.variable_label {
            Some(label) => sample.with_label(label, label_value),
            None => sample,
        }
    }
}

fn fq_name(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}_{}", namespace, name)
    }
}

/// Every metric family the scrape collector can emit
///
/// Built once per process and shared by reference with all collectors.
#[derive(Debug, Clone)]
pub struct ApacheDescs {
    pub up: Desc,
    pub scrape_failures: Desc,
    pub accesses_total: Desc,
    pub sent_bytes_total: Desc,
    pub cpuload: Desc,
    pub uptime: Desc,
    pub workers: Desc,
    pub scoreboard: Desc,
    pub connections: Desc,
}

impl ApacheDescs {
    /// Build the descriptor set under the given namespace
    pub fn new(namespace: &str) -> Self {
        Self {
            up: Desc::new(
                namespace,
                "up",
                "Could the apache server be reached",
                MetricType::Gauge,
            ),
            scrape_failures: Desc::new(
                namespace,
                "exporter_scrape_failures_total",
                "Number of errors while scraping apache.",
                MetricType::Counter,
            ),
            accesses_total: Desc::new(
                namespace,
                "accesses_total",
                "Current total apache accesses (*)",
                MetricType::Counter,
            ),
            sent_bytes_total: Desc::new(
                namespace,
                "sent_bytes_total",
                "Current total bytes sent (*)",
                MetricType::Counter,
            ),
            cpuload: Desc::new(
                namespace,
                "cpuload",
                "The current percentage CPU used by each worker and in total by all workers combined (*)",
                MetricType::Gauge,
            ),
            uptime: Desc::new(
                namespace,
                "uptime_seconds_total",
                "Current uptime in seconds (*)",
                MetricType::Counter,
            ),
            workers: Desc::labeled(
                namespace,
                "workers",
                "Apache worker statuses",
                MetricType::Gauge,
                STATE_LABEL,
            ),
            scoreboard: Desc::labeled(
                namespace,
                "scoreboard",
                "Apache scoreboard statuses",
                MetricType::Gauge,
                STATE_LABEL,
            ),
            connections: Desc::labeled(
                namespace,
                "connections",
                "Apache connection statuses",
                MetricType::Gauge,
                STATE_LABEL,
            ),
        }
    }

    /// Static declaration of every family, in emission order
    pub fn describe(&self) -> Vec<&Desc> {
        vec![
            &self.up,
            &self.accesses_total,
            &self.sent_bytes_total,
            &self.uptime,
            &self.cpuload,
            &self.scrape_failures,
            &self.workers,
            &self.scoreboard,
            &self.connections,
        ]
    }
}

impl Default for ApacheDescs {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}
