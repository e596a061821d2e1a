//! Apache mod_status 수집 모듈
//!
//! `server-status?auto` 엔드포인트를 조회하고, 본문을 파싱하여
//! Prometheus 메트릭 샘플로 변환합니다.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use apache_exporter::collector::{FetchPolicy, ScrapeCollector, StatusClient, Target};
//! use apache_exporter::exposition::ApacheDescs;
//! use tokio_util::sync::CancellationToken;
//!
//! let client = Arc::new(StatusClient::new(FetchPolicy::default())?);
//! let target = Target::parse("http://localhost/server-status?auto")?;
//! let collector = ScrapeCollector::new(target, client, Arc::new(ApacheDescs::default()));
//!
//! let mut samples = Vec::new();
//! collector.collect(&mut samples, &CancellationToken::new()).await?;
//! ```

mod client;
mod fields;
mod parser;
mod registry;
mod scoreboard;
mod scrape;
mod target;

pub use client::{FetchPolicy, StatusClient, StatusResponse};
pub use fields::{map_status, FieldHandler, ScalarMetric};
pub use parser::{fields, split_kv, StatusField};
pub use registry::CollectorRegistry;
pub use scoreboard::{ScoreboardTally, SCOREBOARD_STATES};
pub use scrape::ScrapeCollector;
pub use target::Target;

use crate::error::CollectorError;

/// Collector 작업 결과 타입
pub type CollectResult<T> = Result<T, CollectorError>;
