use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

/// Rate-limited, retrying access to hosted inference models.
///
/// An endpoint names one model on a backend. Transient failures are retried
/// inside the implementation; only terminal errors reach callers.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn call_json(&self, endpoint: &str, payload: &Value) -> Result<Value, BackendError>;

    async fn call_binary(&self, endpoint: &str, data: &[u8]) -> Result<Value, BackendError>;

    /// Tries each endpoint in order, moving on once one is exhausted.
    async fn call_json_with_fallback(
        &self,
        endpoints: &[String],
        payload: &Value,
    ) -> Result<Value, BackendError> {
        let mut attempted = Vec::with_capacity(endpoints.len());
        let mut last = None;

        for endpoint in endpoints {
            match self.call_json(endpoint, payload).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    tracing::warn!(endpoint = %endpoint, error = %e, "Endpoint exhausted, trying next fallback");
                    attempted.push(endpoint.clone());
                    last = Some(e);
                }
            }
        }

        Err(BackendError::fallbacks_exhausted(attempted, last))
    }

    async fn call_binary_with_fallback(
        &self,
        endpoints: &[String],
        data: &[u8],
    ) -> Result<Value, BackendError> {
        let mut attempted = Vec::with_capacity(endpoints.len());
        let mut last = None;

        for endpoint in endpoints {
            match self.call_binary(endpoint, data).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    tracing::warn!(endpoint = %endpoint, error = %e, "Endpoint exhausted, trying next fallback");
                    attempted.push(endpoint.clone());
                    last = Some(e);
                }
            }
        }

        Err(BackendError::fallbacks_exhausted(attempted, last))
    }
}

/// A single failed attempt. Retried by the client; only surfaced inside
/// `BackendError::Exhausted`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransientFailure {
    #[error("model loading, suggested wait {0:?}")]
    ColdStart(Duration),
    #[error("rate limited")]
    RateLimited,
    #[error("status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("transport: {0}")]
    Transport(String),
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("{endpoint} failed after {attempts} attempts: {last_failure}")]
    Exhausted {
        endpoint: String,
        attempts: u32,
        last_failure: TransientFailure,
    },
    #[error("all endpoints failed [{}]: {last}", .attempted.join(", "))]
    FallbacksExhausted {
        attempted: Vec<String>,
        last: Box<BackendError>,
    },
    #[error("invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },
    #[error("backend not configured: {0}")]
    NotConfigured(String),
}

impl BackendError {
    fn fallbacks_exhausted(attempted: Vec<String>, last: Option<BackendError>) -> Self {
        match last {
            Some(last) => BackendError::FallbacksExhausted {
                attempted,
                last: Box::new(last),
            },
            None => BackendError::NotConfigured("no endpoints configured".to_string()),
        }
    }

    pub fn invalid_response(endpoint: &str, reason: impl Into<String>) -> Self {
        BackendError::InvalidResponse {
            endpoint: endpoint.to_string(),
            reason: reason.into(),
        }
    }
}
