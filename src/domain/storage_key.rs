use std::fmt;

use super::InspectionId;

/// Key of an uploaded object in the blob store: `org/inspection/uuid.ext`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn new(org_id: &str, inspection_id: &InspectionId, file_name: &str) -> Self {
        let extension = std::path::Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();
        Self(format!(
            "{}/{}/{}{}",
            org_id,
            inspection_id.as_uuid(),
            uuid::Uuid::new_v4().simple(),
            extension
        ))
    }

    pub fn from_raw(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
