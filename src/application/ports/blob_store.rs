use std::io;

use crate::domain::StorageKey;

#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    async fn read_bytes(&self, key: &StorageKey) -> Result<Vec<u8>, BlobStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum BlobStoreError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("download failed: {0}")]
    DownloadFailed(String),
    #[error("write failed: {0}")]
    WriteFailed(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
