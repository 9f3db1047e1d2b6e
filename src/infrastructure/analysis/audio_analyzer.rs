use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::{AnalysisError, MediaAnalyzer, TranscriptionEngine};
use crate::application::services::meaningful_len;
use crate::domain::{Classification, Evidence};
use crate::infrastructure::observability::sanitize_for_log;

use super::zero_shot::ZeroShotClassifier;

/// Transcripts shorter than this are not worth a classification call.
pub const MIN_SIGNAL_CHARS: usize = 10;

pub struct AudioAnalyzer {
    transcriber: Arc<dyn TranscriptionEngine>,
    classifier: Arc<ZeroShotClassifier>,
}

impl AudioAnalyzer {
    pub fn new(
        transcriber: Arc<dyn TranscriptionEngine>,
        classifier: Arc<ZeroShotClassifier>,
    ) -> Self {
        Self {
            transcriber,
            classifier,
        }
    }
}

#[async_trait]
impl MediaAnalyzer for AudioAnalyzer {
    #[tracing::instrument(skip(self, data), fields(bytes = data.len()))]
    async fn analyze(&self, data: &[u8]) -> Result<Classification, AnalysisError> {
        let transcript = self.transcriber.transcribe(data).await?;
        tracing::info!(transcript = %sanitize_for_log(&transcript), "Audio transcribed");

        let classification = if meaningful_len(&transcript) < MIN_SIGNAL_CHARS {
            tracing::debug!("Transcript too short to classify");
            Classification::insufficient_signal()
        } else {
            self.classifier.classify(&transcript).await?
        };

        let description = format!(
            "Audio transcribed and classified as {}.",
            classification.category
        );
        Ok(classification
            .with_description(description)
            .with_evidence(Evidence::Transcription(transcript)))
    }
}
