mod audio_analyzer;
mod image_analyzer;
mod image_resize;
mod pdf_analyzer;
mod vision;
mod zero_shot;

pub use audio_analyzer::{AudioAnalyzer, MIN_SIGNAL_CHARS};
pub use image_analyzer::ImageAnalyzer;
pub use image_resize::{DEFAULT_MAX_IMAGE_BYTES, ImageDownscaler};
pub use pdf_analyzer::{DEFAULT_EVIDENCE_CHARS, PdfAnalyzer};
pub use vision::VisionClassifier;
pub use zero_shot::{DEFAULT_CLASSIFICATION_CHARS, ZeroShotClassifier};
