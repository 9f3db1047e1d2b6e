use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::application::ports::{InferenceClient, Summarizer, SummarizerError};

#[derive(Debug, Clone, Copy)]
pub struct SummaryLength {
    pub min: u32,
    pub max: u32,
}

impl Default for SummaryLength {
    fn default() -> Self {
        Self { min: 80, max: 400 }
    }
}

/// Abstractive summarization over a hosted seq2seq model.
pub struct HfSummarizer {
    client: Arc<dyn InferenceClient>,
    model: String,
    length: SummaryLength,
}

impl HfSummarizer {
    pub fn new(client: Arc<dyn InferenceClient>, model: String, length: SummaryLength) -> Self {
        Self {
            client,
            model,
            length,
        }
    }
}

#[async_trait]
impl Summarizer for HfSummarizer {
    #[tracing::instrument(skip(self, context), fields(model = %self.model, chars = context.len()))]
    async fn summarize(&self, context: &str) -> Result<String, SummarizerError> {
        let payload = json!({
            "inputs": context,
            "parameters": {
                "max_length": self.length.max,
                "min_length": self.length.min,
                "do_sample": false,
            },
        });

        let response = self.client.call_json(&self.model, &payload).await?;
        summary_text(&response)
            .map(|s| s.trim().to_string())
            .ok_or_else(|| SummarizerError::InvalidResponse("missing `summary_text`".to_string()))
    }
}

fn summary_text(response: &Value) -> Option<&str> {
    match response {
        Value::Array(items) => items.first()?.get("summary_text")?.as_str(),
        other => other.get("summary_text")?.as_str(),
    }
}
