//! Collector lookup by target
//!
//! Only the configured default target owns a long-lived [`ScrapeCollector`],
//! so its failure counter survives across requests. Targets named by a
//! request get a fresh collector that is dropped with the request.

use std::sync::Arc;

use super::client::StatusClient;
use super::scrape::ScrapeCollector;
use super::Target;
use crate::exposition::ApacheDescs;

/// Hands out collectors sharing one client and one descriptor set
#[derive(Debug)]
pub struct CollectorRegistry {
    client: Arc<StatusClient>,
    descs: Arc<ApacheDescs>,
    default: Arc<ScrapeCollector>,
}

impl CollectorRegistry {
    /// Create a registry whose persistent collector scrapes `default_target`
    pub fn new(client: Arc<StatusClient>, descs: Arc<ApacheDescs>, default_target: Target) -> Self {
        let default = Arc::new(ScrapeCollector::new(
            default_target,
            Arc::clone(&client),
            Arc::clone(&descs),
        ));
        Self {
            client,
            descs,
            default,
        }
    }

    /// Collector of the configured default target
    pub fn default_collector(&self) -> &Arc<ScrapeCollector> {
        &self.default
    }

    /// True when `target` is the configured default
    pub fn is_default(&self, target: &Target) -> bool {
        self.default.target() == target
    }

    /// Collector for `target`
    ///
    /// The default target always maps to the same instance. Any other target
    /// gets a new collector that nothing here retains.
    pub fn collector(&self, target: &Target) -> Arc<ScrapeCollector> {
        if self.is_default(target) {
            return Arc::clone(&self.default);
        }

        tracing::debug!(uri = %target, "Creating ad-hoc collector");
        Arc::new(ScrapeCollector::new(
            target.clone(),
            Arc::clone(&self.client),
            Arc::clone(&self.descs),
        ))
    }
}
