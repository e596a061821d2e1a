//! Error types for apache-exporter
//!
//! This module defines the error types used throughout the application.

use std::num::ParseFloatError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Coarse classification of collector errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The status endpoint could not be reached (or the fetch was cancelled)
    Transport,
    /// The endpoint answered with a non-200 status
    ContentValidity,
    /// A recognized field carried a value that is not a number
    Parse,
    /// The target URI is unusable
    Target,
}

/// Collector module errors
#[derive(Error, Debug)]
pub enum CollectorError {
    /// HTTP client could not be built
    #[error("Failed to initialize HTTP client: {0}")]
    HttpClientInit(#[source] reqwest::Error),

    /// Target URI is malformed or not http(s)
    #[error("Invalid target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[source] reqwest::Error),

    /// Reading the response body failed
    #[error("Failed to read HTTP response: {0}")]
    HttpResponse(#[source] reqwest::Error),

    /// Request timed out.
    /// The value is the configured timeout in milliseconds, if known.
    #[error("Request timed out{}", .0.map(|ms| format!(" after {}ms", ms)).unwrap_or_default())]
    Timeout(Option<u64>),

    /// Connection could not be established
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The caller's cancellation signal fired during the fetch
    #[error("Fetch cancelled")]
    Cancelled,

    /// Status endpoint answered with something other than 200
    #[error("Status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// A recognized field did not hold a number
    #[error("Invalid value '{value}' for field '{key}': {source}")]
    InvalidNumber {
        key: String,
        value: String,
        #[source]
        source: ParseFloatError,
    },
}

impl CollectorError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CollectorError::HttpClientInit(_)
            | CollectorError::HttpRequest(_)
            | CollectorError::HttpResponse(_)
            | CollectorError::Timeout(_)
            | CollectorError::ConnectionFailed(_)
            | CollectorError::Cancelled => ErrorKind::Transport,
            CollectorError::HttpStatus { .. } => ErrorKind::ContentValidity,
            CollectorError::InvalidNumber { .. } => ErrorKind::Parse,
            CollectorError::InvalidTarget { .. } => ErrorKind::Target,
        }
    }

    /// HTTP status code carried by the error, if any
    pub fn http_status(&self) -> Option<u16> {
        match self {
            CollectorError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Create a Timeout error with known duration
    pub fn timeout_with_duration(ms: u64) -> Self {
        CollectorError::Timeout(Some(ms))
    }
}

impl From<reqwest::Error> for CollectorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // reqwest does not expose the configured duration here
            CollectorError::Timeout(None)
        } else if err.is_connect() {
            CollectorError::ConnectionFailed(err.to_string())
        } else if err.is_request() {
            CollectorError::HttpRequest(err)
        } else {
            CollectorError::HttpResponse(err)
        }
    }
}

/// Application error type
///
/// Scrape failures never surface here; they are reported through `up` and
/// the failure counter inside a 200 response.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request carried an unusable target
    #[error("Bad target: {0}")]
    BadTarget(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, public_message) = match &self {
            AppError::BadTarget(_) => (StatusCode::BAD_REQUEST, "Invalid target"),
        };

        tracing::warn!(status = %status, error = %self, "Request rejected");

        (status, public_message).into_response()
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            CollectorError::ConnectionFailed("refused".into()).kind(),
            ErrorKind::Transport
        );
        assert_eq!(CollectorError::Cancelled.kind(), ErrorKind::Transport);
        assert_eq!(
            CollectorError::HttpStatus {
                status: 404,
                body: String::new()
            }
            .kind(),
            ErrorKind::ContentValidity
        );

        let source = "x".parse::<f64>().unwrap_err();
        let err = CollectorError::InvalidNumber {
            key: "CPULoad".into(),
            value: "x".into(),
            source,
        };
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.to_string().contains("CPULoad"));
    }

    #[test]
    fn test_timeout_display() {
        assert_eq!(CollectorError::Timeout(None).to_string(), "Request timed out");
        assert_eq!(
            CollectorError::timeout_with_duration(250).to_string(),
            "Request timed out after 250ms"
        );
    }

    #[test]
    fn test_http_status() {
        let err = CollectorError::HttpStatus {
            status: 503,
            body: "busy".into(),
        };
        assert_eq!(err.http_status(), Some(503));
        assert_eq!(err.to_string(), "Status 503: busy");
        assert_eq!(CollectorError::Cancelled.http_status(), None);
    }

    #[test]
    fn test_bad_target_response() {
        let response = AppError::BadTarget("ftp://x".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
