mod pdf_text_extractor;
mod text_sanitizer;

pub use pdf_text_extractor::{DEFAULT_EXTRACTION_TIMEOUT, PdfTextExtractor};
pub use text_sanitizer::sanitize_page_text;
