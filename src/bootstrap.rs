use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{
    BackendError, BlobStore, FileRepository, FindingRepository, InferenceClient,
    InspectionRepository,
};
use crate::application::services::{
    AnalyzerSet, FileOrchestrator, InspectionFinalizer, JobTracker,
};
use crate::config::Settings;
use crate::infrastructure::analysis::{
    AudioAnalyzer, ImageAnalyzer, ImageDownscaler, PdfAnalyzer, VisionClassifier,
    ZeroShotClassifier,
};
use crate::infrastructure::audio::HfWhisperEngine;
use crate::infrastructure::inference::{BackendAuth, BackendClient};
use crate::infrastructure::llm::{HfEmbedder, HfSummarizer, SummaryLength};
use crate::infrastructure::text_processing::PdfTextExtractor;

/// Persistence and storage adapters the orchestrator runs against.
pub struct Stores {
    pub files: Arc<dyn FileRepository>,
    pub findings: Arc<dyn FindingRepository>,
    pub inspections: Arc<dyn InspectionRepository>,
    pub blobs: Arc<dyn BlobStore>,
}

/// Builds the inference backend client shared by every pipeline.
pub fn inference_client(settings: &Settings) -> Result<Arc<dyn InferenceClient>, BackendError> {
    let inference = &settings.inference;
    let auth = if inference.api_token.trim().is_empty() {
        BackendAuth::Anonymous
    } else {
        BackendAuth::Bearer(inference.api_token.clone())
    };

    let client = BackendClient::over_http(
        &inference.base_url,
        auth,
        inference.timeout(),
        inference.max_calls_per_minute,
        inference.retry.policy(),
    )?;
    Ok(Arc::new(client))
}

fn vision_classifier(settings: &Settings) -> Result<Option<VisionClassifier>, BackendError> {
    let vision = &settings.vision;
    if !vision.is_enabled() {
        tracing::info!("Direct vision backend disabled, images use caption-then-classify");
        return Ok(None);
    }

    let client = BackendClient::over_http(
        &vision.base_url,
        BackendAuth::QueryKey(vision.api_key.clone()),
        settings.inference.timeout(),
        vision.max_calls_per_minute,
        settings.inference.retry.policy(),
    )?;
    Ok(Some(VisionClassifier::new(Arc::new(client), &vision.models)))
}

/// Wires pipelines, tracker and finalizer around `client` and `stores`.
pub fn build_orchestrator(
    settings: &Settings,
    client: Arc<dyn InferenceClient>,
    stores: Stores,
) -> Result<FileOrchestrator, BackendError> {
    let analysis = &settings.analysis;
    let models = &settings.models;

    let classifier = Arc::new(ZeroShotClassifier::new(
        Arc::clone(&client),
        models.zero_shot.clone(),
        analysis.classification_chars,
    ));

    let analyzers = AnalyzerSet {
        image: Arc::new(ImageAnalyzer::new(
            ImageDownscaler::with_max_bytes(analysis.max_image_bytes),
            vision_classifier(settings)?,
            Arc::clone(&client),
            models.caption.clone(),
            Arc::clone(&classifier),
        )),
        audio: Arc::new(AudioAnalyzer::new(
            Arc::new(HfWhisperEngine::new(
                Arc::clone(&client),
                models.transcription.clone(),
            )),
            Arc::clone(&classifier),
        )),
        pdf: Arc::new(PdfAnalyzer::new(
            Arc::new(PdfTextExtractor::new(Duration::from_secs(
                analysis.pdf_timeout_secs,
            ))),
            classifier,
            analysis.embedding_input_chars,
        )),
    };

    let embedder = Arc::new(HfEmbedder::new(
        Arc::clone(&client),
        models.embedding.clone(),
        analysis.embedding_dimension,
        analysis.embedding_input_chars,
    ));
    let summarizer = Arc::new(HfSummarizer::new(
        client,
        models.summarization.clone(),
        SummaryLength {
            min: analysis.summary_min_length,
            max: analysis.summary_max_length,
        },
    ));

    let tracker = JobTracker::new(
        Arc::clone(&stores.files),
        Arc::clone(&stores.findings),
        Arc::clone(&stores.inspections),
    );
    let finalizer = InspectionFinalizer::new(
        Arc::clone(&stores.files),
        Arc::clone(&stores.findings),
        Arc::clone(&stores.inspections),
        summarizer,
        analysis.narrative_context_chars,
    );

    Ok(FileOrchestrator::new(
        stores.files,
        stores.findings,
        stores.inspections,
        stores.blobs,
        analyzers,
        embedder,
        tracker,
        finalizer,
    ))
}
