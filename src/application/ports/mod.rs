mod blob_store;
mod embedder;
mod file_repository;
mod finding_repository;
mod inference_client;
mod inspection_repository;
mod media_analyzer;
mod repository_error;
mod summarizer;
mod text_extractor;
mod transcription_engine;

pub use blob_store::{BlobStore, BlobStoreError};
pub use embedder::{Embedder, EmbedderError};
pub use file_repository::FileRepository;
pub use finding_repository::FindingRepository;
pub use inference_client::{BackendError, InferenceClient, TransientFailure};
pub use inspection_repository::InspectionRepository;
pub use media_analyzer::{AnalysisError, MediaAnalyzer};
pub use repository_error::RepositoryError;
pub use summarizer::{Summarizer, SummarizerError};
pub use text_extractor::{TextExtractor, TextExtractorError};
pub use transcription_engine::{TranscriptionEngine, TranscriptionError};
