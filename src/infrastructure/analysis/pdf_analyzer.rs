use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::{AnalysisError, MediaAnalyzer, TextExtractor};
use crate::application::services::{meaningful_len, truncate_chars};
use crate::domain::{Classification, Evidence};

use super::audio_analyzer::MIN_SIGNAL_CHARS;
use super::zero_shot::ZeroShotClassifier;

pub const DEFAULT_EVIDENCE_CHARS: usize = 2000;
const PREVIEW_CHARS: usize = 500;

/// Document pipeline: local text extraction, then zero-shot classification.
/// The evidence text is cut to the embedding budget.
pub struct PdfAnalyzer {
    extractor: Arc<dyn TextExtractor>,
    classifier: Arc<ZeroShotClassifier>,
    evidence_chars: usize,
}

impl PdfAnalyzer {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        classifier: Arc<ZeroShotClassifier>,
        evidence_chars: usize,
    ) -> Self {
        Self {
            extractor,
            classifier,
            evidence_chars,
        }
    }
}

#[async_trait]
impl MediaAnalyzer for PdfAnalyzer {
    #[tracing::instrument(skip(self, data), fields(bytes = data.len()))]
    async fn analyze(&self, data: &[u8]) -> Result<Classification, AnalysisError> {
        let text = self.extractor.extract_text(data).await?;
        let text_length = text.chars().count();
        tracing::info!(chars = text_length, "Extracted document text");

        let classification = if meaningful_len(&text) < MIN_SIGNAL_CHARS {
            Classification::insufficient_signal()
        } else {
            self.classifier.classify(&text).await?
        };

        let description = format!("PDF analyzed and classified as {}.", classification.category);
        Ok(classification
            .with_description(description)
            .with_metadata("text_length", text_length)
            .with_metadata("preview", truncate_chars(&text, PREVIEW_CHARS))
            .with_evidence(Evidence::DocumentText(
                truncate_chars(&text, self.evidence_chars).to_string(),
            )))
    }
}
