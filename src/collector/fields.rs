//! Status field to metric mapping
//!
//! Recognized keys are looked up in a static table of [`FieldHandler`]s.
//! Each handler knows which metric family the field feeds and how its
//! value is converted.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use tracing::trace;

use super::parser::{fields, StatusField};
use super::scoreboard::ScoreboardTally;
use super::CollectResult;
use crate::error::CollectorError;
use crate::exposition::{ApacheDescs, Desc, MetricSink};

/// Unlabeled metric fed by a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarMetric {
    AccessesTotal,
    SentBytesTotal,
    CpuLoad,
    Uptime,
}

impl ScalarMetric {
    /// Descriptor for this metric
    pub fn desc<'a>(&self, descs: &'a ApacheDescs) -> &'a Desc {
        match self {
            ScalarMetric::AccessesTotal => &descs.accesses_total,
            ScalarMetric::SentBytesTotal => &descs.sent_bytes_total,
            ScalarMetric::CpuLoad => &descs.cpuload,
            ScalarMetric::Uptime => &descs.uptime,
        }
    }
}

/// How one recognized status field is turned into samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldHandler {
    /// Cumulative value multiplied by `scale`, emitted immediately
    Counter { metric: ScalarMetric, scale: f64 },
    /// Point-in-time value, emitted immediately
    Gauge { metric: ScalarMetric },
    /// One state of the worker gauge group
    Worker { state: &'static str },
    /// One state of the connections gauge group
    Connection { state: &'static str },
    /// Per-slot scoreboard string
    Scoreboard,
}

static FIELD_HANDLERS: Lazy<HashMap<&'static str, FieldHandler>> = Lazy::new(|| {
    HashMap::from([
        (
            "Total Accesses",
            FieldHandler::Counter {
                metric: ScalarMetric::AccessesTotal,
                scale: 1.0,
            },
        ),
        (
            "Total kBytes",
            FieldHandler::Counter {
                metric: ScalarMetric::SentBytesTotal,
                scale: 1024.0,
            },
        ),
        (
            "CPULoad",
            FieldHandler::Gauge {
                metric: ScalarMetric::CpuLoad,
            },
        ),
        (
            "Uptime",
            FieldHandler::Counter {
                metric: ScalarMetric::Uptime,
                scale: 1.0,
            },
        ),
        ("BusyWorkers", FieldHandler::Worker { state: "busy" }),
        ("IdleWorkers", FieldHandler::Worker { state: "idle" }),
        ("Scoreboard", FieldHandler::Scoreboard),
        ("ConnsTotal", FieldHandler::Connection { state: "total" }),
        ("ConnsAsyncWriting", FieldHandler::Connection { state: "writing" }),
        ("ConnsAsyncKeepAlive", FieldHandler::Connection { state: "keepalive" }),
        ("ConnsAsyncClosing", FieldHandler::Connection { state: "closing" }),
    ])
});

impl FieldHandler {
    /// Handler for a status key, `None` when the key is not recognized
    pub fn lookup(key: &str) -> Option<FieldHandler> {
        FIELD_HANDLERS.get(key).copied()
    }
}

fn parse_number(field: &StatusField<'_>) -> CollectResult<f64> {
    field
        .value
        .parse::<f64>()
        .map_err(|source| CollectorError::InvalidNumber {
            key: field.key.to_string(),
            value: field.value.to_string(),
            source,
        })
}

/// Gauge group whose samples are emitted once the whole body was parsed
#[derive(Debug, Default)]
struct GaugeGroup {
    values: Vec<(&'static str, f64)>,
}

impl GaugeGroup {
    fn set(&mut self, state: &'static str, value: f64) {
        match self.values.iter_mut().find(|(s, _)| *s == state) {
            Some(entry) => entry.1 = value,
            None => self.values.push((state, value)),
        }
    }

    fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn emit<S: MetricSink + ?Sized>(&self, desc: &Desc, sink: &mut S) {
        for (state, value) in &self.values {
            sink.emit(desc.labeled_sample(state, *value));
        }
    }
}

/// Map a status body to samples
///
/// Counter and gauge fields and the scoreboard are emitted as their line is reached.
/// The worker and connection groups are emitted after the last line; the
/// connection group only when at least one `Conns*` field was present.
///
/// A malformed number stops the mapping and is returned as
/// [`CollectorError::InvalidNumber`]. Samples emitted before that point stay
/// in the sink.
pub fn map_status<S: MetricSink + ?Sized>(
    body: &str,
    descs: &ApacheDescs,
    sink: &mut S,
) -> CollectResult<()> {
    let mut workers = GaugeGroup::default();
    let mut connections = GaugeGroup::default();

    for field in fields(body) {
        let Some(handler) = FieldHandler::lookup(field.key) else {
            trace!(key = field.key, "Skipping unrecognized field");
            continue;
        };

        match handler {
            FieldHandler::Counter { metric, scale } => {
                let value = parse_number(&field)?;
                sink.emit(metric.desc(descs).sample(value * scale));
            }
            FieldHandler::Gauge { metric } => {
                sink.emit(metric.desc(descs).sample(parse_number(&field)?));
            }
            FieldHandler::Worker { state } => workers.set(state, parse_number(&field)?),
            FieldHandler::Connection { state } => connections.set(state, parse_number(&field)?),
            FieldHandler::Scoreboard => {
                let tally = ScoreboardTally::decode(field.value);
                for (state, count) in tally.iter() {
                    sink.emit(descs.scoreboard.labeled_sample(state, count as f64));
                }
            }
        }
    }

    workers.emit(&descs.workers, sink);
    if !connections.is_empty() {
        connections.emit(&descs.connections, sink);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exposition::{MetricSample, MetricType};

    fn map(body: &str) -> (Vec<MetricSample>, CollectResult<()>) {
        let descs = ApacheDescs::default();
        let mut sink = Vec::new();
        let result = map_status(body, &descs, &mut sink);
        (sink, result)
    }

    fn value_of(samples: &[MetricSample], name: &str, state: Option<&str>) -> Option<f64> {
        samples
            .iter()
            .find(|s| s.name == name && s.label("state") == state)
            .map(|s| s.value)
    }

    #[test]
    fn test_lookup() {
        assert_eq!(
            FieldHandler::lookup("BusyWorkers"),
            Some(FieldHandler::Worker { state: "busy" })
        );
        assert_eq!(FieldHandler::lookup("Scoreboard"), Some(FieldHandler::Scoreboard));
        assert_eq!(
            FieldHandler::lookup("Total kBytes"),
            Some(FieldHandler::Counter {
                metric: ScalarMetric::SentBytesTotal,
                scale: 1024.0
            })
        );
        assert_eq!(
            FieldHandler::lookup("CPULoad"),
            Some(FieldHandler::Gauge {
                metric: ScalarMetric::CpuLoad
            })
        );
        assert_eq!(FieldHandler::lookup("busyworkers"), None);
        assert_eq!(FieldHandler::lookup("ServerVersion"), None);
    }

    #[test]
    fn test_handler_kind_matches_descriptor_type() {
        let descs = ApacheDescs::default();
        for handler in FIELD_HANDLERS.values() {
            match handler {
                FieldHandler::Counter { metric, .. } => {
                    assert_eq!(metric.desc(&descs).metric_type(), MetricType::Counter)
                }
                FieldHandler::Gauge { metric } => {
                    assert_eq!(metric.desc(&descs).metric_type(), MetricType::Gauge)
                }
                _ => {}
            }
        }
    }

    #[test]
    fn test_kbytes_scaled_to_bytes() {
        let (samples, result) = map("Total kBytes: 512\n");
        assert!(result.is_ok());
        assert_eq!(value_of(&samples, "apache_sent_bytes_total", None), Some(524288.0));
    }

    #[test]
    fn test_basic_body() {
        let (samples, result) =
            map("Total Accesses: 1000\nTotal kBytes: 512\nBusyWorkers: 3\nIdleWorkers: 7\n");
        assert!(result.is_ok());

        assert_eq!(samples.len(), 4);
        assert_eq!(value_of(&samples, "apache_accesses_total", None), Some(1000.0));
        assert_eq!(value_of(&samples, "apache_sent_bytes_total", None), Some(524288.0));
        assert_eq!(value_of(&samples, "apache_workers", Some("busy")), Some(3.0));
        assert_eq!(value_of(&samples, "apache_workers", Some("idle")), Some(7.0));
        assert!(samples.iter().all(|s| s.name != "apache_connections"));
        assert!(samples.iter().all(|s| s.name != "apache_scoreboard"));
    }

    #[test]
    fn test_busy_only_has_no_idle_sample() {
        let (samples, _) = map("BusyWorkers: 12\n");
        assert_eq!(value_of(&samples, "apache_workers", Some("busy")), Some(12.0));
        assert_eq!(value_of(&samples, "apache_workers", Some("idle")), None);
    }

    #[test]
    fn test_connections_gated_on_presence() {
        let (samples, _) = map("Uptime: 100\nBusyWorkers: 1\n");
        assert!(samples.iter().all(|s| s.name != "apache_connections"));

        let (samples, _) = map("ConnsTotal: 5\n");
        let connections: Vec<&MetricSample> = samples
            .iter()
            .filter(|s| s.name == "apache_connections")
            .collect();
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].label("state"), Some("total"));
        assert_eq!(connections[0].value, 5.0);
    }

    #[test]
    fn test_all_connection_states() {
        let body = "ConnsTotal: 9\nConnsAsyncWriting: 1\nConnsAsyncKeepAlive: 6\nConnsAsyncClosing: 2\n";
        let (samples, _) = map(body);

        assert_eq!(value_of(&samples, "apache_connections", Some("total")), Some(9.0));
        assert_eq!(value_of(&samples, "apache_connections", Some("writing")), Some(1.0));
        assert_eq!(value_of(&samples, "apache_connections", Some("keepalive")), Some(6.0));
        assert_eq!(value_of(&samples, "apache_connections", Some("closing")), Some(2.0));
    }

    #[test]
    fn test_scoreboard_samples() {
        let (samples, _) = map("Scoreboard: _W_K..X\n");
        let scoreboard: Vec<&MetricSample> = samples
            .iter()
            .filter(|s| s.name == "apache_scoreboard")
            .collect();

        assert_eq!(scoreboard.len(), 12);
        let total: f64 = scoreboard.iter().map(|s| s.value).sum();
        assert_eq!(total, 7.0);
        assert_eq!(value_of(&samples, "apache_scoreboard", Some("X")), Some(1.0));
        assert_eq!(value_of(&samples, "apache_scoreboard", Some("dns")), Some(0.0));
    }

    #[test]
    fn test_parse_error_keeps_prior_samples() {
        let body = "Total Accesses: 10\nUptime: 300\nBusyWorkers: 2\nCPULoad: not-a-number\nIdleWorkers: 4\n";
        let (samples, result) = map(body);

        let err = result.unwrap_err();
        assert!(matches!(
            err,
            CollectorError::InvalidNumber { ref key, ref value, .. }
                if key == "CPULoad" && value == "not-a-number"
        ));

        assert_eq!(value_of(&samples, "apache_accesses_total", None), Some(10.0));
        assert_eq!(value_of(&samples, "apache_uptime_seconds_total", None), Some(300.0));
        // groups are only emitted after a complete parse
        assert!(samples.iter().all(|s| s.name != "apache_workers"));
    }

    #[test]
    fn test_unrecognized_keys_ignored() {
        let body = "ServerVersion: Apache/2.4.41\nServerMPM: event\nReqPerSec: .35\nUptime: 5\n";
        let (samples, result) = map(body);
        assert!(result.is_ok());
        assert_eq!(samples.len(), 1);
    }

    #[test]
    fn test_counter_regression_passes_through() {
        // a restarted server reports smaller or even negative totals; no clamping
        let (samples, _) = map("Total Accesses: -5\n");
        assert_eq!(value_of(&samples, "apache_accesses_total", None), Some(-5.0));
    }

    #[test]
    fn test_fractional_cpuload() {
        let (samples, _) = map("CPULoad: .0394\n");
        assert_eq!(value_of(&samples, "apache_cpuload", None), Some(0.0394));
    }

    #[test]
    fn test_empty_body() {
        let (samples, result) = map("");
        assert!(result.is_ok());
        assert!(samples.is_empty());
    }
}
