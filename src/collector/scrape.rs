//! One scrape cycle against one target
//!
//! A cycle is fetch → validate → map → emit, run while holding the
//! collector's lock so overlapping requests for the same target never
//! interleave their samples.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use super::client::StatusClient;
use super::fields::map_status;
use super::{CollectResult, Target};
use crate::error::CollectorError;
use crate::exposition::{ApacheDescs, Desc, MetricSink};

/// State that outlives a single cycle
#[derive(Debug, Default)]
struct CollectorState {
    /// Failed cycles since the collector was created, never reset
    failures: u64,
}

/// Scrape collector bound to a single target
#[derive(Debug)]
pub struct ScrapeCollector {
    target: Target,
    client: Arc<StatusClient>,
    descs: Arc<ApacheDescs>,
    state: Mutex<CollectorState>,
}

impl ScrapeCollector {
    /// Create a collector for `target`
    pub fn new(target: Target, client: Arc<StatusClient>, descs: Arc<ApacheDescs>) -> Self {
        Self {
            target,
            client,
            descs,
            state: Mutex::new(CollectorState::default()),
        }
    }

    /// Target this collector scrapes
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Every metric family this collector can emit
    pub fn describe(&self) -> Vec<&Desc> {
        self.descs.describe()
    }

    /// Current value of the failure counter
    pub async fn failures(&self) -> u64 {
        self.state.lock().await.failures
    }

    /// Run one collection cycle, writing samples into `sink`
    ///
    /// `up` is always the first sample. On failure the failure counter is
    /// incremented and emitted before returning, so the sink always holds a
    /// well-formed (possibly partial) batch. The error is logged and also
    /// returned for callers that want to inspect it.
    pub async fn collect<S: MetricSink + ?Sized>(
        &self,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> CollectResult<()> {
        let mut state = self.state.lock().await;

        let result = self.run_cycle(sink, cancel).await;

        if let Err(ref e) = result {
            error!(uri = %self.target, error = %e, "Error scraping target");
            state.failures += 1;
            sink.emit(self.descs.scrape_failures.sample(state.failures as f64));
        }

        result
    }

    async fn run_cycle<S: MetricSink + ?Sized>(
        &self,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> CollectResult<()> {
        let response = match self.client.fetch(&self.target, cancel).await {
            Ok(response) => response,
            Err(e) => {
                sink.emit(self.descs.up.sample(0.0));
                return Err(e);
            }
        };

        // reachable, even if the content below turns out to be unusable
        sink.emit(self.descs.up.sample(1.0));

        if response.status != 200 {
            return Err(CollectorError::HttpStatus {
                status: response.status,
                body: response.body,
            });
        }

        map_status(&response.body, &self.descs, sink)?;

        debug!(uri = %self.target, "Scrape complete");
        Ok(())
    }
}
