use async_trait::async_trait;

/// Local, non-network text extraction from document bytes.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Returns the concatenated text of all non-empty pages. A document
    /// without any text yields an empty string.
    async fn extract_text(&self, data: &[u8]) -> Result<String, TextExtractorError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TextExtractorError {
    #[error("extraction failed: {0}")]
    ExtractionFailed(String),
    #[error("extraction timed out")]
    TimedOut,
}
