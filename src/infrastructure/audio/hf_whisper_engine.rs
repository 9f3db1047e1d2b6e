use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::application::ports::{InferenceClient, TranscriptionEngine, TranscriptionError};

/// Speech-to-text over a hosted Whisper model. Raw audio bytes are posted
/// as the request body.
pub struct HfWhisperEngine {
    client: Arc<dyn InferenceClient>,
    model: String,
}

impl HfWhisperEngine {
    pub fn new(client: Arc<dyn InferenceClient>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl TranscriptionEngine for HfWhisperEngine {
    async fn transcribe(&self, audio_data: &[u8]) -> Result<String, TranscriptionError> {
        tracing::debug!(model = %self.model, bytes = audio_data.len(), "Sending audio for transcription");

        let response = self.client.call_binary(&self.model, audio_data).await?;
        let Some(transcript) = transcript_text(&response) else {
            tracing::warn!(model = %self.model, "Transcription response had no text, treating as silence");
            return Ok(String::new());
        };

        tracing::info!(chars = transcript.len(), "Transcription completed");
        Ok(transcript.trim().to_string())
    }
}

/// `{"text": ..}` or `[{"text": ..}]`.
fn transcript_text(response: &Value) -> Option<&str> {
    match response {
        Value::Array(items) => items.first()?.get("text")?.as_str(),
        other => other.get("text")?.as_str(),
    }
}
