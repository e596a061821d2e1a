//! Scrape target identity

use std::fmt;

use url::Url;

use super::CollectResult;
use crate::error::CollectorError;

/// One remote status endpoint
///
/// Always an absolute `http` or `https` URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    url: Url,
}

impl Target {
    /// Parse and validate a target URI
    pub fn parse(uri: &str) -> CollectResult<Self> {
        let url = Url::parse(uri.trim()).map_err(|e| CollectorError::InvalidTarget {
            target: uri.to_string(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(CollectorError::InvalidTarget {
                    target: uri.to_string(),
                    reason: format!("unsupported scheme '{}'", other),
                })
            }
        }

        if url.host_str().is_none() {
            return Err(CollectorError::InvalidTarget {
                target: uri.to_string(),
                reason: "missing host".to_string(),
            });
        }

        Ok(Self { url })
    }

    /// Target URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Target URL as a string
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

impl std::str::FromStr for Target {
    type Err = CollectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
