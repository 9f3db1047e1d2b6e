use async_trait::async_trait;

use super::BackendError;

#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    async fn transcribe(&self, audio_data: &[u8]) -> Result<String, TranscriptionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("transcription backend: {0}")]
    Backend(#[from] BackendError),
    #[error("invalid transcription response: {0}")]
    InvalidResponse(String),
}
