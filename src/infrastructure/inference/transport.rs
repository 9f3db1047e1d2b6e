use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde_json::Value;

#[derive(Clone, Copy)]
pub enum RequestBody<'a> {
    Json(&'a Value),
    Binary(&'a [u8]),
}

#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    /// Parsed `Retry-After` header, when the server sent one in seconds.
    pub retry_after: Option<Duration>,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// The single network seam of the backend client.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn post(
        &self,
        url: &str,
        body: RequestBody<'_>,
    ) -> Result<TransportResponse, TransportError>;
}

#[derive(Debug, Clone)]
pub enum BackendAuth {
    Bearer(String),
    /// API key passed as the `key` query parameter.
    QueryKey(String),
    Anonymous,
}

pub struct ReqwestTransport {
    client: Client,
    auth: BackendAuth,
}

impl ReqwestTransport {
    pub fn new(auth: BackendAuth, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError(format!("client build: {e}")))?;
        Ok(Self { client, auth })
    }

    pub fn with_client(client: Client, auth: BackendAuth) -> Self {
        Self { client, auth }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post(
        &self,
        url: &str,
        body: RequestBody<'_>,
    ) -> Result<TransportResponse, TransportError> {
        let mut request = self.client.post(url);

        request = match &self.auth {
            BackendAuth::Bearer(token) => request.bearer_auth(token),
            BackendAuth::QueryKey(key) => request.query(&[("key", key.as_str())]),
            BackendAuth::Anonymous => request,
        };

        request = match body {
            RequestBody::Json(payload) => request.json(payload),
            RequestBody::Binary(data) => request
                .header("Content-Type", "application/octet-stream")
                .body(data.to_vec()),
        };

        let response = request
            .send()
            .await
            .map_err(|e| TransportError(format!("request: {e}")))?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_secs);

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError(format!("body: {e}")))?;

        Ok(TransportResponse {
            status,
            retry_after,
            body,
        })
    }
}
