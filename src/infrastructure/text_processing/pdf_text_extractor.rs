use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::{TextExtractor, TextExtractorError};

use super::text_sanitizer::sanitize_page_text;

pub const DEFAULT_EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Local page-by-page PDF text extraction. Parsing runs on the blocking pool
/// under a timeout; a panic inside the parser surfaces as an extraction error.
pub struct PdfTextExtractor {
    timeout: Duration,
}

impl Default for PdfTextExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_EXTRACTION_TIMEOUT)
    }
}

impl PdfTextExtractor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn extract_pages(data: &[u8]) -> Result<Vec<String>, TextExtractorError> {
        pdf_extract::extract_text_from_mem_by_pages(data)
            .map_err(|e| TextExtractorError::ExtractionFailed(format!("failed to parse PDF: {e}")))
    }
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    #[tracing::instrument(skip(self, data), fields(bytes = data.len()))]
    async fn extract_text(&self, data: &[u8]) -> Result<String, TextExtractorError> {
        let owned = data.to_vec();

        let pages = tokio::time::timeout(
            self.timeout,
            tokio::task::spawn_blocking(move || Self::extract_pages(&owned)),
        )
        .await
        .map_err(|_| TextExtractorError::TimedOut)?
        .map_err(|e| TextExtractorError::ExtractionFailed(format!("extraction task: {e}")))??;

        let page_count = pages.len();
        let text = pages
            .iter()
            .map(|page| sanitize_page_text(page))
            .filter(|page| !page.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");

        tracing::info!(page_count, chars = text.len(), "PDF text extraction complete");
        Ok(text)
    }
}
