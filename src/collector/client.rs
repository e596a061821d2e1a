//! mod_status HTTP 클라이언트
//!
//! 프로세스 단위 TLS 정책과 타임아웃을 가진 비동기 HTTP 클라이언트입니다.

use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::{CollectResult, Target};
use crate::error::CollectorError;

/// 기본 요청 타임아웃 (밀리초)
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// 프로세스 전역 fetch 정책
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPolicy {
    /// 인증서 검증 생략 여부 (기본값: false)
    pub insecure: bool,
    /// 요청 타임아웃 (밀리초)
    pub timeout_ms: u64,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            insecure: false,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// 상태 페이지 응답
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusResponse {
    /// HTTP 상태 코드
    pub status: u16,
    /// 응답 본문
    pub body: String,
}

/// mod_status HTTP 클라이언트
#[derive(Clone)]
pub struct StatusClient {
    client: Client,
    policy: FetchPolicy,
}

impl StatusClient {
    /// 새 클라이언트 생성
    ///
    /// # Example
    /// ```ignore
    /// let client = StatusClient::new(FetchPolicy::default())?;
    /// ```
    pub fn new(policy: FetchPolicy) -> CollectResult<Self> {
        if policy.insecure {
            tracing::warn!("TLS certificate verification is disabled for scrape targets");
        }

        let client = ClientBuilder::new()
            .timeout(Duration::from_millis(policy.timeout_ms))
            .danger_accept_invalid_certs(policy.insecure)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(CollectorError::HttpClientInit)?;

        Ok(Self { client, policy })
    }

    /// 상태 페이지 조회
    ///
    /// 2xx 가 아닌 응답도 에러가 아니라 그대로 반환합니다. 판단은 호출자가 합니다.
    /// `cancel` 이 먼저 발생하면 [`CollectorError::Cancelled`] 를 반환합니다.
    #[instrument(skip(self, target, cancel), fields(uri = %target))]
    pub async fn fetch(
        &self,
        target: &Target,
        cancel: &CancellationToken,
    ) -> CollectResult<StatusResponse> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Fetch cancelled");
                Err(CollectorError::Cancelled)
            }
            result = self.send(target) => result,
        }
    }

    async fn send(&self, target: &Target) -> CollectResult<StatusResponse> {
        debug!("Sending status request");

        let response = self
            .client
            .get(target.url().clone())
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status().as_u16();

        // bytes() 가 응답 스트림을 소비하고 닫습니다
        let body = response
            .bytes()
            .await
            .map_err(|e| match self.map_transport_error(e) {
                CollectorError::HttpRequest(e) => CollectorError::HttpResponse(e),
                other => other,
            })?;

        debug!(status, bytes = body.len(), "Received status response");

        Ok(StatusResponse {
            status,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }

    fn map_transport_error(&self, err: reqwest::Error) -> CollectorError {
        match CollectorError::from(err) {
            CollectorError::Timeout(None) => {
                CollectorError::timeout_with_duration(self.policy.timeout_ms)
            }
            other => other,
        }
    }
}

impl std::fmt::Debug for StatusClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusClient")
            .field("policy", &self.policy)
            .finish()
    }
}
