use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{
    Classification, DefectCategory, Embedding, Evidence, FileId, FindingId, InspectionId, Severity,
};

#[derive(Debug, Clone)]
pub struct Finding {
    pub id: FindingId,
    pub inspection_id: InspectionId,
    pub file_id: Option<FileId>,
    pub category: DefectCategory,
    pub severity: Option<Severity>,
    pub confidence: f32,
    pub needs_review: bool,
    pub description: String,
    pub ai_caption: Option<String>,
    pub transcription: Option<String>,
    pub metadata: BTreeMap<String, Value>,
    pub embedding: Embedding,
    pub created_at: DateTime<Utc>,
}

impl Finding {
    /// Builds the persisted record for one analyzed file. Per-label scores
    /// land under the `label_scores` metadata key.
    pub fn from_classification(
        inspection_id: InspectionId,
        file_id: FileId,
        classification: Classification,
        embedding: Embedding,
    ) -> Self {
        let mut metadata = classification.metadata;
        if !classification.label_scores.is_empty() {
            let scores: serde_json::Map<String, Value> = classification
                .label_scores
                .into_iter()
                .map(|(label, score)| (label, Value::from(f64::from(score))))
                .collect();
            metadata.insert("label_scores".to_string(), Value::Object(scores));
        }

        let (ai_caption, transcription) = match classification.evidence {
            Evidence::Caption(text) => (Some(text), None),
            Evidence::Transcription(text) => (None, Some(text)),
            Evidence::DocumentText(_) | Evidence::None => (None, None),
        };

        Self {
            id: FindingId::new(),
            inspection_id,
            file_id: Some(file_id),
            category: classification.category,
            severity: classification.severity,
            confidence: classification.confidence,
            needs_review: classification.needs_review,
            description: classification.description,
            ai_caption,
            transcription,
            metadata,
            embedding,
            created_at: Utc::now(),
        }
    }

    /// Text that best summarizes the finding for a narrative line.
    pub fn summary_text(&self) -> &str {
        self.ai_caption
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| {
                self.transcription
                    .as_deref()
                    .filter(|s| !s.trim().is_empty())
            })
            .unwrap_or(&self.description)
    }
}
