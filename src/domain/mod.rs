mod classification;
mod defect_category;
mod embedding;
mod file;
mod file_id;
mod file_status;
mod finding;
mod finding_id;
mod inspection;
mod inspection_id;
mod inspection_status;
mod media_type;
mod severity;
mod storage_key;

pub use classification::{AnalysisOutcome, Classification, Evidence};
pub use defect_category::{CONFIDENCE_THRESHOLD, DefectCategory};
pub use embedding::{EMBEDDING_DIMENSION, Embedding};
pub use file::InspectionFile;
pub use file_id::FileId;
pub use file_status::FileStatus;
pub use finding::Finding;
pub use finding_id::FindingId;
pub use inspection::{Inspection, InspectionReport, InspectionSettlement};
pub use inspection_id::InspectionId;
pub use inspection_status::InspectionStatus;
pub use media_type::MediaType;
pub use severity::Severity;
pub use storage_key::StorageKey;
