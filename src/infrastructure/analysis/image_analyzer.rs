use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::application::ports::{AnalysisError, BackendError, InferenceClient, MediaAnalyzer};
use crate::domain::{Classification, Evidence};
use crate::infrastructure::observability::sanitize_for_log;

use super::image_resize::ImageDownscaler;
use super::vision::VisionClassifier;
use super::zero_shot::ZeroShotClassifier;

const UNAVAILABLE_DESCRIPTION: &str =
    "Automatic image analysis was unavailable for this file. Manual review required.";

/// Image pipeline. Uses direct vision classification when a vision backend
/// is configured, otherwise captions the image and classifies the caption.
///
/// Never fails: when every backend option is exhausted the result is a
/// degraded classification flagged for review.
pub struct ImageAnalyzer {
    downscaler: ImageDownscaler,
    vision: Option<VisionClassifier>,
    captioner: Arc<dyn InferenceClient>,
    caption_models: Vec<String>,
    classifier: Arc<ZeroShotClassifier>,
}

impl ImageAnalyzer {
    pub fn new(
        downscaler: ImageDownscaler,
        vision: Option<VisionClassifier>,
        captioner: Arc<dyn InferenceClient>,
        caption_models: Vec<String>,
        classifier: Arc<ZeroShotClassifier>,
    ) -> Self {
        Self {
            downscaler,
            vision,
            captioner,
            caption_models,
            classifier,
        }
    }

    fn prepare<'a>(&self, data: &'a [u8]) -> Cow<'a, [u8]> {
        match self.downscaler.fit(data) {
            Ok(fitted) if fitted.len() < data.len() => Cow::Owned(fitted),
            Ok(_) => Cow::Borrowed(data),
            Err(e) => {
                tracing::warn!(error = %e, bytes = data.len(), "Image re-encode failed, sending original bytes");
                Cow::Borrowed(data)
            }
        }
    }

    async fn classify(&self, image: &[u8]) -> Result<Classification, BackendError> {
        if let Some(vision) = &self.vision {
            return vision.classify(image).await;
        }

        let caption = self.caption(image).await?;
        tracing::info!(caption = %sanitize_for_log(&caption), "Image captioned");

        let classification = self.classifier.classify(&caption).await?;
        let description = format!(
            "Image classified as {} with {:.0}% confidence.",
            classification.category,
            classification.confidence * 100.0
        );

        Ok(classification
            .with_description(description)
            .with_evidence(Evidence::Caption(caption)))
    }

    /// First non-empty caption across the configured models, in order.
    async fn caption(&self, image: &[u8]) -> Result<String, BackendError> {
        let mut attempted = Vec::with_capacity(self.caption_models.len());
        let mut last = None;

        for model in &self.caption_models {
            let outcome = self
                .captioner
                .call_binary(model, image)
                .await
                .and_then(|response| {
                    generated_text(&response)
                        .ok_or_else(|| BackendError::invalid_response(model, "empty caption"))
                });

            match outcome {
                Ok(caption) => return Ok(caption),
                Err(e) => {
                    tracing::warn!(model = %model, error = %e, "Captioning failed, trying next model");
                    attempted.push(model.clone());
                    last = Some(e);
                }
            }
        }

        match last {
            Some(last) => Err(BackendError::FallbacksExhausted {
                attempted,
                last: Box::new(last),
            }),
            None => Err(BackendError::NotConfigured(
                "no captioning models configured".to_string(),
            )),
        }
    }
}

#[async_trait]
impl MediaAnalyzer for ImageAnalyzer {
    #[tracing::instrument(skip(self, data), fields(bytes = data.len()))]
    async fn analyze(&self, data: &[u8]) -> Result<Classification, AnalysisError> {
        let image = self.prepare(data);

        match self.classify(&image).await {
            Ok(classification) => Ok(classification),
            Err(e) => {
                tracing::warn!(error = %e, "Image analysis unavailable, emitting degraded result");
                Ok(Classification::degraded(e.to_string(), UNAVAILABLE_DESCRIPTION))
            }
        }
    }
}

/// `[{"generated_text": ..}]` or `{"generated_text": ..}`, trimmed, non-empty.
fn generated_text(response: &Value) -> Option<String> {
    let entry = match response {
        Value::Array(items) => items.first()?,
        other => other,
    };
    let text = entry.get("generated_text")?.as_str()?.trim();
    (!text.is_empty()).then(|| text.to_string())
}
