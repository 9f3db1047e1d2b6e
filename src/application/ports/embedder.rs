use async_trait::async_trait;

use crate::domain::Embedding;

use super::BackendError;

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbedderError>;

    fn dimensions(&self) -> usize;
}

#[derive(Debug, thiserror::Error)]
pub enum EmbedderError {
    #[error("embedding backend: {0}")]
    Backend(#[from] BackendError),
    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),
}
