use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use auditpilot::application::ports::{
    AnalysisError, BackendError, InferenceClient, MediaAnalyzer, TextExtractor,
    TextExtractorError, TranscriptionEngine, TranscriptionError, TransientFailure,
};
use auditpilot::domain::{AnalysisOutcome, DefectCategory, Evidence, Severity};
use auditpilot::infrastructure::analysis::{
    AudioAnalyzer, DEFAULT_CLASSIFICATION_CHARS, DEFAULT_EVIDENCE_CHARS, ImageAnalyzer,
    ImageDownscaler, PdfAnalyzer, VisionClassifier, ZeroShotClassifier,
};
use auditpilot::infrastructure::audio::HfWhisperEngine;

const ZERO_SHOT: &str = "facebook/bart-large-mnli";
const WHISPER: &str = "openai/whisper-large-v3";

/// Answers by endpoint; endpoints without a route fail as exhausted.
#[derive(Default)]
struct MockInferenceClient {
    routes: HashMap<String, Value>,
    calls: Mutex<Vec<String>>,
}

impl MockInferenceClient {
    fn route(mut self, endpoint: &str, response: Value) -> Self {
        self.routes.insert(endpoint.to_string(), response);
        self
    }

    fn calls_to(&self, endpoint: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.as_str() == endpoint)
            .count()
    }

    fn answer(&self, endpoint: &str) -> Result<Value, BackendError> {
        self.calls.lock().unwrap().push(endpoint.to_string());
        self.routes
            .get(endpoint)
            .cloned()
            .ok_or_else(|| BackendError::Exhausted {
                endpoint: endpoint.to_string(),
                attempts: 3,
                last_failure: TransientFailure::Status {
                    status: 500,
                    body: "internal error".to_string(),
                },
            })
    }
}

#[async_trait]
impl InferenceClient for MockInferenceClient {
    async fn call_json(&self, endpoint: &str, _payload: &Value) -> Result<Value, BackendError> {
        self.answer(endpoint)
    }

    async fn call_binary(&self, endpoint: &str, _data: &[u8]) -> Result<Value, BackendError> {
        self.answer(endpoint)
    }
}

struct MockTranscriptionEngine {
    transcript: Result<String, String>,
}

#[async_trait]
impl TranscriptionEngine for MockTranscriptionEngine {
    async fn transcribe(&self, _audio_data: &[u8]) -> Result<String, TranscriptionError> {
        self.transcript
            .clone()
            .map_err(TranscriptionError::InvalidResponse)
    }
}

struct MockTextExtractor {
    text: Result<String, ()>,
}

#[async_trait]
impl TextExtractor for MockTextExtractor {
    async fn extract_text(&self, _data: &[u8]) -> Result<String, TextExtractorError> {
        self.text.clone().map_err(|_| TextExtractorError::TimedOut)
    }
}

fn zero_shot_answer(label: &str, score: f64) -> Value {
    json!({
        "sequence": "ignored",
        "labels": [label, "clear/no defect"],
        "scores": [score, 1.0 - score]
    })
}

fn classifier(client: &Arc<MockInferenceClient>) -> Arc<ZeroShotClassifier> {
    Arc::new(ZeroShotClassifier::new(
        Arc::clone(client) as Arc<dyn InferenceClient>,
        ZERO_SHOT.to_string(),
        DEFAULT_CLASSIFICATION_CHARS,
    ))
}

fn image_analyzer(client: &Arc<MockInferenceClient>, vision: Option<VisionClassifier>) -> ImageAnalyzer {
    ImageAnalyzer::new(
        ImageDownscaler::default(),
        vision,
        Arc::clone(client) as Arc<dyn InferenceClient>,
        vec!["blip-large".to_string(), "blip-base".to_string()],
        classifier(client),
    )
}

#[tokio::test]
async fn given_caption_and_labels_when_analyzing_image_then_classified_with_caption_evidence() {
    let client = Arc::new(
        MockInferenceClient::default()
            .route("blip-large", json!([{"generated_text": "exposed wires near a puddle"}]))
            .route(ZERO_SHOT, zero_shot_answer("electrical hazard", 0.92)),
    );
    let analyzer = image_analyzer(&client, None);

    let c = analyzer.analyze(b"not-really-a-jpeg").await.unwrap();

    assert_eq!(c.category, DefectCategory::ElectricalHazard);
    assert_eq!(c.severity, Some(Severity::Critical));
    assert!(!c.needs_review);
    assert_eq!(
        c.description,
        "Image classified as electrical hazard with 92% confidence."
    );
    assert_eq!(
        c.evidence,
        Evidence::Caption("exposed wires near a puddle".to_string())
    );
    assert_eq!(client.calls_to("blip-base"), 0);
}

#[tokio::test]
async fn given_first_caption_model_down_when_analyzing_image_then_next_model_is_used() {
    let client = Arc::new(
        MockInferenceClient::default()
            .route("blip-base", json!({"generated_text": "a cracked support column"}))
            .route(ZERO_SHOT, zero_shot_answer("structural damage", 0.7)),
    );
    let analyzer = image_analyzer(&client, None);

    let c = analyzer.analyze(b"bytes").await.unwrap();

    assert_eq!(c.category, DefectCategory::StructuralDamage);
    assert_eq!(client.calls_to("blip-large"), 1);
    assert_eq!(client.calls_to("blip-base"), 1);
}

#[tokio::test]
async fn given_every_backend_down_when_analyzing_image_then_degraded_result_not_error() {
    let client = Arc::new(MockInferenceClient::default());
    let analyzer = image_analyzer(&client, None);

    let c = analyzer.analyze(b"bytes").await.unwrap();

    assert_eq!(c.category, DefectCategory::Unknown);
    assert_eq!(c.severity, Some(Severity::Medium));
    assert_eq!(c.confidence, 0.0);
    assert!(c.needs_review);
    assert!(c.is_degraded());
    assert!(c.metadata.contains_key("pipeline_error"));
    assert_eq!(client.calls_to(ZERO_SHOT), 0);
}

#[tokio::test]
async fn given_vision_backend_when_analyzing_image_then_captioning_is_skipped() {
    let verdict = r#"{"category":"water damage","confidence":0.81,"severity":"low","description":"Water pooling under the sink."}"#;
    let client = Arc::new(MockInferenceClient::default().route(
        "gemini-2.0-flash:generateContent",
        json!({"candidates": [{"content": {"parts": [{"text": verdict}]}}]}),
    ));
    let vision = VisionClassifier::new(
        Arc::clone(&client) as Arc<dyn InferenceClient>,
        &["gemini-2.0-flash".to_string()],
    );
    let analyzer = image_analyzer(&client, Some(vision));

    let c = analyzer.analyze(b"bytes").await.unwrap();

    assert_eq!(c.category, DefectCategory::WaterDamage);
    assert_eq!(c.severity, Some(Severity::High));
    assert_eq!(c.description, "Water pooling under the sink.");
    assert_eq!(client.calls_to("blip-large"), 0);
    assert_eq!(client.calls_to(ZERO_SHOT), 0);
}

#[tokio::test]
async fn given_short_transcript_when_analyzing_audio_then_insufficient_signal_without_classifier_call() {
    let client = Arc::new(MockInferenceClient::default());
    let analyzer = AudioAnalyzer::new(
        Arc::new(MockTranscriptionEngine {
            transcript: Ok("  uh ok ".to_string()),
        }),
        classifier(&client),
    );

    let c = analyzer.analyze(b"RIFF").await.unwrap();

    assert_eq!(c.outcome, AnalysisOutcome::InsufficientSignal);
    assert_eq!(c.category, DefectCategory::ClearNoDefect);
    assert_eq!(c.severity, Some(Severity::Clear));
    assert!(c.needs_review);
    assert_eq!(c.evidence, Evidence::Transcription("  uh ok ".to_string()));
    assert_eq!(client.calls_to(ZERO_SHOT), 0);
}

#[tokio::test]
async fn given_spoken_note_when_analyzing_audio_then_transcript_is_classified() {
    let client = Arc::new(
        MockInferenceClient::default().route(ZERO_SHOT, zero_shot_answer("fire risk", 0.55)),
    );
    let analyzer = AudioAnalyzer::new(
        Arc::new(MockTranscriptionEngine {
            transcript: Ok("oily rags stacked next to the boiler".to_string()),
        }),
        classifier(&client),
    );

    let c = analyzer.analyze(b"RIFF").await.unwrap();

    assert_eq!(c.category, DefectCategory::FireRisk);
    assert_eq!(c.severity, Some(Severity::High));
    assert!(c.needs_review);
    assert_eq!(c.description, "Audio transcribed and classified as fire risk.");
}

#[tokio::test]
async fn given_transcription_response_without_text_when_analyzing_audio_then_insufficient_signal() {
    for response in [json!({}), json!([])] {
        let client = Arc::new(MockInferenceClient::default().route(WHISPER, response));
        let engine = HfWhisperEngine::new(client.clone(), WHISPER.to_string());
        let analyzer = AudioAnalyzer::new(Arc::new(engine), classifier(&client));

        let c = analyzer.analyze(b"RIFF").await.unwrap();

        assert_eq!(c.outcome, AnalysisOutcome::InsufficientSignal);
        assert_eq!(c.category, DefectCategory::ClearNoDefect);
        assert!(c.needs_review);
        assert_eq!(c.evidence, Evidence::Transcription(String::new()));
        assert_eq!(client.calls_to(WHISPER), 1);
        assert_eq!(client.calls_to(ZERO_SHOT), 0);
    }
}

#[tokio::test]
async fn given_transcription_backend_down_when_analyzing_audio_then_error_propagates() {
    let client = Arc::new(MockInferenceClient::default());
    let engine = HfWhisperEngine::new(client.clone(), WHISPER.to_string());
    let analyzer = AudioAnalyzer::new(Arc::new(engine), classifier(&client));

    let result = analyzer.analyze(b"RIFF").await;

    assert!(matches!(result, Err(AnalysisError::Transcription(_))));
}

#[tokio::test]
async fn given_transcription_failure_when_analyzing_audio_then_error_propagates() {
    let client = Arc::new(MockInferenceClient::default());
    let analyzer = AudioAnalyzer::new(
        Arc::new(MockTranscriptionEngine {
            transcript: Err("no text".to_string()),
        }),
        classifier(&client),
    );

    let result = analyzer.analyze(b"RIFF").await;

    assert!(matches!(result, Err(AnalysisError::Transcription(_))));
}

#[tokio::test]
async fn given_long_document_when_analyzing_pdf_then_metadata_and_truncated_evidence() {
    let client = Arc::new(
        MockInferenceClient::default().route(ZERO_SHOT, zero_shot_answer("equipment issue", 0.8)),
    );
    let text = "Pump seal leaking at station 4. ".repeat(200);
    let analyzer = PdfAnalyzer::new(
        Arc::new(MockTextExtractor {
            text: Ok(text.clone()),
        }),
        classifier(&client),
        DEFAULT_EVIDENCE_CHARS,
    );

    let c = analyzer.analyze(b"%PDF-1.7").await.unwrap();

    assert_eq!(c.category, DefectCategory::EquipmentIssue);
    assert_eq!(c.severity, Some(Severity::Medium));
    assert_eq!(c.description, "PDF analyzed and classified as equipment issue.");
    assert_eq!(c.metadata["text_length"], json!(text.chars().count()));
    assert_eq!(
        c.metadata["preview"].as_str().unwrap().chars().count(),
        500
    );
    assert_eq!(c.evidence.text().chars().count(), DEFAULT_EVIDENCE_CHARS);
}

#[tokio::test]
async fn given_document_without_text_when_analyzing_pdf_then_insufficient_signal() {
    let client = Arc::new(MockInferenceClient::default());
    let analyzer = PdfAnalyzer::new(
        Arc::new(MockTextExtractor {
            text: Ok(String::new()),
        }),
        classifier(&client),
        DEFAULT_EVIDENCE_CHARS,
    );

    let c = analyzer.analyze(b"%PDF-1.7").await.unwrap();

    assert_eq!(c.outcome, AnalysisOutcome::InsufficientSignal);
    assert_eq!(c.metadata["text_length"], json!(0));
    assert_eq!(client.calls_to(ZERO_SHOT), 0);
}

#[tokio::test]
async fn given_extraction_timeout_when_analyzing_pdf_then_error_propagates() {
    let client = Arc::new(MockInferenceClient::default());
    let analyzer = PdfAnalyzer::new(
        Arc::new(MockTextExtractor { text: Err(()) }),
        classifier(&client),
        DEFAULT_EVIDENCE_CHARS,
    );

    let result = analyzer.analyze(b"%PDF-1.7").await;

    assert!(matches!(
        result,
        Err(AnalysisError::Extraction(TextExtractorError::TimedOut))
    ));
}
