use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::application::ports::{BackendError, InferenceClient, TransientFailure};

use super::rate_limiter::SlidingWindowRateLimiter;
use super::retry_policy::RetryPolicy;
use super::transport::{
    BackendAuth, HttpTransport, RequestBody, ReqwestTransport, TransportResponse,
};

const STATUS_TOO_MANY_REQUESTS: u16 = 429;
const STATUS_SERVICE_UNAVAILABLE: u16 = 503;

/// Rate-limited, retrying client for one inference backend.
///
/// Endpoints are model identifiers appended to `base_url`. One instance is
/// shared by every pipeline that talks to the backend so they all draw from
/// the same rate-limit window.
pub struct BackendClient {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    limiter: Arc<SlidingWindowRateLimiter>,
    policy: RetryPolicy,
}

impl BackendClient {
    pub fn new(
        base_url: &str,
        transport: Arc<dyn HttpTransport>,
        limiter: Arc<SlidingWindowRateLimiter>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            limiter,
            policy,
        }
    }

    pub fn over_http(
        base_url: &str,
        auth: BackendAuth,
        timeout: Duration,
        max_calls_per_minute: usize,
        policy: RetryPolicy,
    ) -> Result<Self, BackendError> {
        let transport = ReqwestTransport::new(auth, timeout)
            .map_err(|e| BackendError::NotConfigured(e.to_string()))?;
        Ok(Self::new(
            base_url,
            Arc::new(transport),
            Arc::new(SlidingWindowRateLimiter::per_minute(max_calls_per_minute)),
            policy,
        ))
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    fn url_for(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    async fn call(&self, endpoint: &str, body: RequestBody<'_>) -> Result<Value, BackendError> {
        let url = self.url_for(endpoint);
        let mut attempt: u32 = 1;
        let mut cold_start_waits: u32 = 0;

        loop {
            self.limiter.acquire().await;

            let (failure, delay) = match self.transport.post(&url, body).await {
                Ok(response) if response.is_success() => {
                    return serde_json::from_slice(&response.body)
                        .map_err(|e| BackendError::invalid_response(endpoint, e.to_string()));
                }
                Ok(response) if response.status == STATUS_SERVICE_UNAVAILABLE => {
                    let wait = self.policy.cold_start_delay(cold_start_hint(&response));
                    if cold_start_waits < self.policy.max_cold_start_waits {
                        cold_start_waits += 1;
                        tracing::info!(
                            endpoint = %endpoint,
                            wait_ms = wait.as_millis() as u64,
                            attempt,
                            "Model loading, retrying same attempt"
                        );
                        tokio::time::sleep(wait).await;
                        continue;
                    }
                    (
                        TransientFailure::ColdStart(wait),
                        self.policy.backoff_delay(attempt),
                    )
                }
                Ok(response) if response.status == STATUS_TOO_MANY_REQUESTS => {
                    let hint = response.retry_after.or_else(|| retry_delay_hint(&response));
                    (
                        TransientFailure::RateLimited,
                        self.policy.rate_limit_delay(attempt, hint),
                    )
                }
                Ok(response) => (
                    TransientFailure::Status {
                        status: response.status,
                        body: truncate_body(&response.body_text()),
                    },
                    self.policy.backoff_delay(attempt),
                ),
                Err(e) => (
                    TransientFailure::Transport(e.to_string()),
                    self.policy.backoff_delay(attempt),
                ),
            };

            if attempt >= self.policy.max_attempts {
                tracing::error!(
                    endpoint = %endpoint,
                    attempts = attempt,
                    failure = %failure,
                    "Backend call failed after all attempts"
                );
                return Err(BackendError::Exhausted {
                    endpoint: endpoint.to_string(),
                    attempts: attempt,
                    last_failure: failure,
                });
            }

            tracing::warn!(
                endpoint = %endpoint,
                failure = %failure,
                delay_ms = delay.as_millis() as u64,
                attempt,
                "Backend call failed, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

#[async_trait]
impl InferenceClient for BackendClient {
    async fn call_json(&self, endpoint: &str, payload: &Value) -> Result<Value, BackendError> {
        self.call(endpoint, RequestBody::Json(payload)).await
    }

    async fn call_binary(&self, endpoint: &str, data: &[u8]) -> Result<Value, BackendError> {
        self.call(endpoint, RequestBody::Binary(data)).await
    }
}

/// `estimated_time` (seconds) from a model-loading response body.
fn cold_start_hint(response: &TransportResponse) -> Option<Duration> {
    let body: Value = serde_json::from_slice(&response.body).ok()?;
    body.get("estimated_time")
        .and_then(Value::as_f64)
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(Duration::from_secs_f64)
}

/// `retryDelay` from a `RetryInfo` detail in a JSON error body, e.g. `"12s"`.
/// One second is added to land after the quota resets.
fn retry_delay_hint(response: &TransportResponse) -> Option<Duration> {
    let body: Value = serde_json::from_slice(&response.body).ok()?;
    let details = body.get("error")?.get("details")?.as_array()?;

    details
        .iter()
        .filter(|d| {
            d.get("@type")
                .and_then(Value::as_str)
                .is_some_and(|t| t.ends_with("RetryInfo"))
        })
        .filter_map(|d| d.get("retryDelay").and_then(Value::as_str))
        .filter_map(|s| s.strip_suffix('s'))
        .filter_map(|s| s.parse::<f64>().ok())
        .find(|secs| secs.is_finite() && *secs >= 0.0)
        .map(|secs| Duration::from_secs_f64(secs + 1.0))
}

fn truncate_body(body: &str) -> String {
    const MAX_BODY_CHARS: usize = 200;
    body.chars().take(MAX_BODY_CHARS).collect()
}
