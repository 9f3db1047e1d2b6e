use std::sync::Arc;

use serde_json::{Value, json};

use crate::application::ports::{BackendError, InferenceClient};
use crate::application::services::truncate_chars;
use crate::domain::{Classification, DefectCategory};

pub const DEFAULT_CLASSIFICATION_CHARS: usize = 1024;

/// Zero-shot text classification against the defect taxonomy.
pub struct ZeroShotClassifier {
    client: Arc<dyn InferenceClient>,
    model: String,
    max_input_chars: usize,
}

impl ZeroShotClassifier {
    pub fn new(client: Arc<dyn InferenceClient>, model: String, max_input_chars: usize) -> Self {
        Self {
            client,
            model,
            max_input_chars,
        }
    }

    #[tracing::instrument(skip(self, text), fields(model = %self.model, chars = text.len()))]
    pub async fn classify(&self, text: &str) -> Result<Classification, BackendError> {
        let payload = json!({
            "inputs": truncate_chars(text, self.max_input_chars),
            "parameters": { "candidate_labels": DefectCategory::candidate_labels() },
        });

        let response = self.client.call_json(&self.model, &payload).await?;
        let ranked = parse_ranked_labels(&response)
            .ok_or_else(|| BackendError::invalid_response(&self.model, "no labels in response"))?;

        Ok(Classification::from_ranked_labels(ranked))
    }
}

/// Accepts `{"labels": [...], "scores": [...]}`, the same wrapped in a
/// list, or `[{"label": .., "score": ..}, ...]`. Output is sorted by score.
fn parse_ranked_labels(response: &Value) -> Option<Vec<(String, f32)>> {
    let mut ranked = match response {
        Value::Object(_) => parse_parallel_arrays(response)?,
        Value::Array(items) => {
            let first = items.first()?;
            if first.get("labels").is_some() {
                parse_parallel_arrays(first)?
            } else {
                items
                    .iter()
                    .filter_map(|item| {
                        let label = item.get("label")?.as_str()?;
                        let score = item.get("score")?.as_f64()?;
                        Some((label.to_string(), score as f32))
                    })
                    .collect()
            }
        }
        _ => return None,
    };

    if ranked.is_empty() {
        return None;
    }
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    Some(ranked)
}

fn parse_parallel_arrays(value: &Value) -> Option<Vec<(String, f32)>> {
    let labels = value.get("labels")?.as_array()?;
    let scores = value.get("scores")?.as_array()?;

    Some(
        labels
            .iter()
            .zip(scores.iter())
            .filter_map(|(l, s)| Some((l.as_str()?.to_string(), s.as_f64()? as f32)))
            .collect(),
    )
}
