//! Prometheus Exposition Format output
//!
//! Renders [`MetricSample`]s into the text exposition format (version 0.0.4).
//!
//! ```text
//! # HELP <family> <help_text>
//! # TYPE <family> <type>
//! <metric_name>{<label1>="<value1>",<label2>="<value2>"} <value>
//! ```

use std::collections::HashMap;

use super::metric::MetricSample;

/// Content type of the rendered output
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Prometheus text format renderer
///
/// # Example
///
/// ```ignore
/// use apache_exporter::exposition::{ApacheDescs, PrometheusFormatter};
///
/// let descs = ApacheDescs::default();
/// let output = PrometheusFormatter::new().format(&[descs.up.sample(1.0)]);
/// assert!(output.contains("apache_up 1"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PrometheusFormatter;

impl PrometheusFormatter {
    /// Create a new formatter
    pub fn new() -> Self {
        Self
    }

    /// Format samples into Prometheus exposition format
    ///
    /// HELP and TYPE are written once per family, families appear in the
    /// order they were first emitted, and samples keep their emission order
    /// inside a family.
    pub fn format(&self, samples: &[MetricSample]) -> String {
        if samples.is_empty() {
            return String::new();
        }

        let mut output = String::with_capacity(samples.len() * 80);

        for (family, group) in Self::group_by_family(samples) {
            let head = group[0];
            if let Some(help) = &head.help {
                output.push_str(&format!("# HELP {} {}\n", family, Self::escape_help(help)));
            }
            output.push_str(&format!("# TYPE {} {}\n", family, head.metric_type.as_str()));

            for sample in group {
                output.push_str(&Self::format_sample_line(sample));
                output.push('\n');
            }
        }

        output
    }

    /// Group samples by family, preserving order of first occurrence
    fn group_by_family(samples: &[MetricSample]) -> Vec<(&str, Vec<&MetricSample>)> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<(&str, Vec<&MetricSample>)> = Vec::new();

        for sample in samples {
            let family = sample.family();
            match index.get(family) {
                Some(&i) => groups[i].1.push(sample),
                None => {
                    index.insert(family, groups.len());
                    groups.push((family, vec![sample]));
                }
            }
        }

        groups
    }

    fn format_sample_line(sample: &MetricSample) -> String {
        let mut line = sample.name.clone();

        // BTreeMap iteration is already sorted by label name
        if !sample.labels.is_empty() {
            let pairs: Vec<String> = sample
                .labels
                .iter()
                .map(|(k, v)| format!("{}=\"{}\"", k, Self::escape_label_value(v)))
                .collect();

            line.push('{');
            line.push_str(&pairs.join(","));
            line.push('}');
        }

        line.push(' ');
        line.push_str(&Self::format_value(sample.value));
        line
    }

    /// Format a numeric value
    ///
    /// - NaN → "NaN"
    /// - +Inf → "+Inf", -Inf → "-Inf"
    /// - integral values below 1e15 without a decimal point
    /// - everything else through `f64`'s shortest round-trip representation
    fn format_value(value: f64) -> String {
        if value.is_nan() {
            "NaN".to_string()
        } else if value.is_infinite() {
            if value.is_sign_positive() {
                "+Inf".to_string()
            } else {
                "-Inf".to_string()
            }
        } else if value.fract() == 0.0 && value.abs() < 1e15 {
            format!("{}", value as i64)
        } else if value.abs() >= 1e15 {
            format!("{:e}", value)
        } else {
            format!("{}", value)
        }
    }

    /// Escapes backslash and newline characters.
    fn escape_help(help: &str) -> String {
        help.replace('\\', "\\\\").replace('\n', "\\n")
    }

    /// Escapes backslash, double-quote, and newline characters.
    fn escape_label_value(value: &str) -> String {
        let mut escaped = String::with_capacity(value.len());
        for c in value.chars() {
            match c {
                '\\' => escaped.push_str("\\\\"),
                '"' => escaped.push_str("\\\""),
                '\n' => escaped.push_str("\\n"),
                _ => escaped.push(c),
            }
        }
        escaped
    }
}
