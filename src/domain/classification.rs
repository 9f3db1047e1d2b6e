use std::collections::BTreeMap;

use serde_json::Value;

use super::{CONFIDENCE_THRESHOLD, DefectCategory, Severity};

/// Text a pipeline derived from the raw media, used for the finding body and
/// its embedding.
#[derive(Debug, Clone, PartialEq)]
pub enum Evidence {
    Caption(String),
    Transcription(String),
    DocumentText(String),
    None,
}

impl Evidence {
    pub fn text(&self) -> &str {
        match self {
            Evidence::Caption(t) | Evidence::Transcription(t) | Evidence::DocumentText(t) => t,
            Evidence::None => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Classified,
    /// Too little text to classify; no classification call was made.
    InsufficientSignal,
    /// Every backend option failed; the result is a placeholder for review.
    Degraded { reason: String },
}

/// Structured output of a media pipeline, not yet persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub category: DefectCategory,
    pub confidence: f32,
    pub severity: Option<Severity>,
    pub needs_review: bool,
    pub description: String,
    pub label_scores: BTreeMap<String, f32>,
    pub evidence: Evidence,
    pub metadata: BTreeMap<String, Value>,
    pub outcome: AnalysisOutcome,
}

impl Classification {
    /// Builds a classification from ranked label scores, taking the first
    /// entry as the winner. Severity comes from the category table and
    /// `needs_review` from the confidence threshold.
    pub fn from_ranked_labels(ranked: Vec<(String, f32)>) -> Self {
        let (top_label, top_score) = ranked
            .first()
            .cloned()
            .unwrap_or_else(|| (DefectCategory::Unknown.label().to_string(), 0.0));
        let category = DefectCategory::from_label(&top_label);
        let confidence = top_score.clamp(0.0, 1.0);

        Self {
            category,
            confidence,
            severity: category.severity().or(Some(Severity::Medium)),
            needs_review: confidence < CONFIDENCE_THRESHOLD,
            description: String::new(),
            label_scores: ranked.into_iter().collect(),
            evidence: Evidence::None,
            metadata: BTreeMap::new(),
            outcome: AnalysisOutcome::Classified,
        }
    }

    /// Result for a transcript or document too short to carry signal.
    pub fn insufficient_signal() -> Self {
        Self {
            category: DefectCategory::ClearNoDefect,
            confidence: 0.0,
            severity: Some(Severity::Clear),
            needs_review: true,
            description: String::new(),
            label_scores: BTreeMap::new(),
            evidence: Evidence::None,
            metadata: BTreeMap::new(),
            outcome: AnalysisOutcome::InsufficientSignal,
        }
    }

    /// Placeholder emitted when every backend option failed.
    pub fn degraded(reason: impl Into<String>, description: impl Into<String>) -> Self {
        let reason = reason.into();
        let mut metadata = BTreeMap::new();
        metadata.insert("pipeline_error".to_string(), Value::String(reason.clone()));

        Self {
            category: DefectCategory::Unknown,
            confidence: 0.0,
            severity: Some(Severity::Medium),
            needs_review: true,
            description: description.into(),
            label_scores: BTreeMap::new(),
            evidence: Evidence::None,
            metadata,
            outcome: AnalysisOutcome::Degraded { reason },
        }
    }

    /// Applies a backend-asserted category/confidence pair. The category
    /// table wins over `asserted_severity` for taxonomy members.
    pub fn from_assertion(
        label: &str,
        confidence: f32,
        asserted_severity: Option<Severity>,
    ) -> Self {
        let category = DefectCategory::from_label(label);
        let confidence = confidence.clamp(0.0, 1.0);
        let mut label_scores = BTreeMap::new();
        label_scores.insert(category.label().to_string(), confidence);

        Self {
            category,
            confidence,
            severity: category
                .severity()
                .or(asserted_severity)
                .or(Some(Severity::Medium)),
            needs_review: confidence < CONFIDENCE_THRESHOLD,
            description: String::new(),
            label_scores,
            evidence: Evidence::None,
            metadata: BTreeMap::new(),
            outcome: AnalysisOutcome::Classified,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidence = evidence;
        self
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.outcome, AnalysisOutcome::Degraded { .. })
    }
}
