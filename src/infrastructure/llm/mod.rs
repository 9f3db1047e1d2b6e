mod hf_embedder;
mod hf_summarizer;

pub use hf_embedder::{DEFAULT_EMBEDDING_INPUT_CHARS, HfEmbedder};
pub use hf_summarizer::{HfSummarizer, SummaryLength};
