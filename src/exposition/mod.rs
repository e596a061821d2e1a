//! Prometheus exposition primitives
//!
//! Metric descriptors, the samples produced from them, the sink the
//! collectors write into, and the text format renderer.

pub mod formatter;
pub mod metric;

pub use formatter::PrometheusFormatter;
pub use metric::{ApacheDescs, Desc, MetricSample, MetricSink, MetricType};
