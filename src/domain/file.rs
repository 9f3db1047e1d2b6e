use chrono::{DateTime, Utc};

use super::{FileId, FileStatus, InspectionId, MediaType, StorageKey};

/// An uploaded artifact belonging to an inspection.
#[derive(Debug, Clone)]
pub struct InspectionFile {
    pub id: FileId,
    pub inspection_id: InspectionId,
    pub file_name: String,
    pub media_type: MediaType,
    pub storage_key: StorageKey,
    pub status: FileStatus,
    pub error_message: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl InspectionFile {
    pub fn new(
        inspection_id: InspectionId,
        file_name: String,
        media_type: MediaType,
        storage_key: StorageKey,
    ) -> Self {
        Self {
            id: FileId::new(),
            inspection_id,
            file_name,
            media_type,
            storage_key,
            status: FileStatus::Pending,
            error_message: None,
            processed_at: None,
            created_at: Utc::now(),
        }
    }
}
