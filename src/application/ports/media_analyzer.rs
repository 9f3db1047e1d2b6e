use async_trait::async_trait;

use crate::domain::Classification;

use super::{BackendError, TextExtractorError, TranscriptionError};

/// One analysis pipeline per media type.
#[async_trait]
pub trait MediaAnalyzer: Send + Sync {
    async fn analyze(&self, data: &[u8]) -> Result<Classification, AnalysisError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("classification: {0}")]
    Classification(#[from] BackendError),
    #[error("transcription: {0}")]
    Transcription(#[from] TranscriptionError),
    #[error("text extraction: {0}")]
    Extraction(#[from] TextExtractorError),
}
