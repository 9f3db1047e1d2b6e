use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::application::ports::{BackendError, InferenceClient};
use crate::application::services::truncate_chars;
use crate::domain::{Classification, Evidence, Severity};

const FALLBACK_MIME: &str = "image/jpeg";
const RAW_EXCERPT_CHARS: usize = 200;

const ANALYSIS_PROMPT: &str = r#"You are an expert building inspector and safety auditor. Analyze this image and identify any defects, hazards, or issues.

Respond with ONLY a valid JSON object (no markdown, no code fences) in this exact format:
{
  "category": "<one of: structural damage, electrical hazard, water damage, fire risk, equipment issue, fall hazard, clear/no defect>",
  "confidence": <float between 0.0 and 1.0>,
  "severity": "<one of: critical, high, medium, low, clear>",
  "description": "<what you see, max 2 sentences>",
  "defects_found": <true or false>
}

Category and severity mapping:
- structural damage -> critical
- electrical hazard -> critical
- fire risk -> high
- water damage -> high
- fall hazard -> high
- equipment issue -> medium
- clear/no defect -> clear

Rules:
- If you see ANY damage, defect, or hazard, pick the most appropriate category. Do NOT default to "clear/no defect".
- Set confidence from how certain you are (0.0 uncertain, 1.0 very certain).
- If there are multiple issues, report the most severe one."#;

#[derive(Debug, Deserialize)]
struct VisionVerdict {
    #[serde(default)]
    category: String,
    #[serde(default)]
    confidence: f32,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    description: String,
}

/// Direct image classification through a multimodal `generateContent` backend.
///
/// Models are tried in order; each is addressed as `{model}:generateContent`.
pub struct VisionClassifier {
    client: Arc<dyn InferenceClient>,
    endpoints: Vec<String>,
}

impl VisionClassifier {
    pub fn new(client: Arc<dyn InferenceClient>, models: &[String]) -> Self {
        Self {
            client,
            endpoints: models
                .iter()
                .map(|m| format!("{m}:generateContent"))
                .collect(),
        }
    }

    #[tracing::instrument(skip(self, image), fields(bytes = image.len()))]
    pub async fn classify(&self, image: &[u8]) -> Result<Classification, BackendError> {
        let payload = build_payload(image);
        let response = self
            .client
            .call_json_with_fallback(&self.endpoints, &payload)
            .await?;

        let text = response_text(&response).ok_or_else(|| {
            BackendError::invalid_response("generateContent", "no candidate text in response")
        })?;

        Ok(parse_verdict(text))
    }
}

fn build_payload(image: &[u8]) -> Value {
    json!({
        "contents": [{
            "parts": [
                { "text": ANALYSIS_PROMPT },
                { "inline_data": { "mime_type": sniff_image_mime(image), "data": STANDARD.encode(image) } }
            ]
        }],
        "generationConfig": { "temperature": 0.1, "maxOutputTokens": 500 }
    })
}

fn sniff_image_mime(image: &[u8]) -> &'static str {
    infer::get(image)
        .map(|kind| kind.mime_type())
        .filter(|mime| mime.starts_with("image/"))
        .unwrap_or(FALLBACK_MIME)
}

fn response_text(response: &Value) -> Option<&str> {
    response
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()
}

fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

/// Model text to a classification. Unparseable output is not an error: it
/// becomes a degraded result that carries an excerpt of what came back.
fn parse_verdict(text: &str) -> Classification {
    let verdict: VisionVerdict = match serde_json::from_str(strip_code_fences(text)) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "Vision response is not valid JSON");
            return Classification::degraded(
                "unparseable vision response",
                format!(
                    "AI analysis returned unparseable response. Raw: {}",
                    truncate_chars(text, RAW_EXCERPT_CHARS)
                ),
            );
        }
    };

    let asserted = verdict
        .severity
        .as_deref()
        .and_then(|s| s.parse::<Severity>().ok());
    let classification = Classification::from_assertion(&verdict.category, verdict.confidence, asserted);

    if verdict.description.trim().is_empty() {
        classification
    } else {
        let description = verdict.description.trim().to_string();
        classification
            .with_evidence(Evidence::Caption(description.clone()))
            .with_description(description)
    }
}
