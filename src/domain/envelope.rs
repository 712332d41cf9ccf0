// Fetch envelope - Normalized result of every backend call
use serde::{Deserialize, Serialize};

/// Informational rate-limit headers reported by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitInfo {
    pub limit: Option<u64>,
    pub remaining: Option<u64>,
    pub reset: Option<u64>,
}

impl RateLimitInfo {
    pub fn is_empty(&self) -> bool {
        self.limit.is_none() && self.remaining.is_none() && self.reset.is_none()
    }
}

/// `{ data | error, status }` wrapper returned by the API client.
///
/// A status of `0` means the request never produced a usable HTTP response
/// (connection failure, undecodable body).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchEnvelope<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimitInfo>,
}

impl<T> FetchEnvelope<T> {
    pub fn success(data: T, status: u16) -> Self {
        Self {
            data: Some(data),
            error: None,
            status,
            rate_limit: None,
        }
    }

    pub fn failure(error: impl Into<String>, status: u16) -> Self {
        Self {
            data: None,
            error: Some(error.into()),
            status,
            rate_limit: None,
        }
    }

    pub fn transport_failure(error: impl Into<String>) -> Self {
        Self::failure(error, 0)
    }

    pub fn with_rate_limit(mut self, rate_limit: Option<RateLimitInfo>) -> Self {
        self.rate_limit = rate_limit.filter(|r| !r.is_empty());
        self
    }

    pub fn is_success(&self) -> bool {
        self.data.is_some()
    }

    pub fn is_transport_failure(&self) -> bool {
        self.status == 0
    }

    /// Collapse into a `Result`, used by polling hooks that treat the
    /// envelope error as a failed attempt.
    pub fn into_result(self) -> anyhow::Result<T> {
        match (self.data, self.error) {
            (Some(data), _) => Ok(data),
            (None, Some(error)) => Err(anyhow::anyhow!(error)),
            (None, None) => Err(anyhow::anyhow!("HTTP {}", self.status)),
        }
    }
}
