use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::application::ports::{Embedder, EmbedderError, InferenceClient};
use crate::application::services::truncate_chars;
use crate::domain::Embedding;

pub const DEFAULT_EMBEDDING_INPUT_CHARS: usize = 2000;

/// Sentence embeddings from a hosted feature-extraction model.
pub struct HfEmbedder {
    client: Arc<dyn InferenceClient>,
    model: String,
    dimensions: usize,
    max_input_chars: usize,
}

impl HfEmbedder {
    pub fn new(
        client: Arc<dyn InferenceClient>,
        model: String,
        dimensions: usize,
        max_input_chars: usize,
    ) -> Self {
        Self {
            client,
            model,
            dimensions,
            max_input_chars,
        }
    }
}

#[async_trait]
impl Embedder for HfEmbedder {
    #[tracing::instrument(skip(self, text), fields(model = %self.model, chars = text.len()))]
    async fn embed(&self, text: &str) -> Result<Embedding, EmbedderError> {
        if text.trim().is_empty() {
            return Ok(Embedding::zeros(self.dimensions));
        }

        let payload = json!({ "inputs": truncate_chars(text, self.max_input_chars) });
        let response = self.client.call_json(&self.model, &payload).await?;

        let values = parse_vector(&response).ok_or_else(|| {
            EmbedderError::InvalidResponse("expected a list of floats".to_string())
        })?;

        if values.len() != self.dimensions {
            tracing::warn!(
                expected = self.dimensions,
                actual = values.len(),
                "Embedding dimension mismatch"
            );
        }

        Ok(Embedding::new(values))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Flat `[f, ..]` or nested `[[f, ..]]`.
fn parse_vector(response: &Value) -> Option<Vec<f32>> {
    let items = response.as_array()?;
    let row = match items.first() {
        Some(Value::Array(inner)) => inner,
        _ => items,
    };
    row.iter().map(|v| v.as_f64().map(|f| f as f32)).collect()
}
