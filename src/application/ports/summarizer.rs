use async_trait::async_trait;

use super::BackendError;

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, context: &str) -> Result<String, SummarizerError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SummarizerError {
    #[error("summarization backend: {0}")]
    Backend(#[from] BackendError),
    #[error("invalid summary response: {0}")]
    InvalidResponse(String),
}
