use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use object_store::local::LocalFileSystem;
use object_store::path::Path as StorePath;
use object_store::{ObjectStore, PutPayload};

use crate::application::ports::{BlobStore, BlobStoreError};
use crate::domain::StorageKey;

/// Uploaded file content on the local filesystem, addressed by storage key
/// relative to the upload root.
pub struct LocalBlobStore {
    inner: Arc<LocalFileSystem>,
}

impl LocalBlobStore {
    pub fn new(root: PathBuf) -> Result<Self, BlobStoreError> {
        std::fs::create_dir_all(&root)?;
        let fs = LocalFileSystem::new_with_prefix(root)
            .map_err(|e| BlobStoreError::WriteFailed(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(fs),
        })
    }

    pub async fn put(&self, key: &StorageKey, data: Bytes) -> Result<(), BlobStoreError> {
        self.inner
            .put(&StorePath::from(key.as_str()), PutPayload::from(data))
            .await
            .map_err(|e| BlobStoreError::WriteFailed(format!("{key}: {e}")))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl BlobStore for LocalBlobStore {
    #[tracing::instrument(skip(self), fields(key = %key))]
    async fn read_bytes(&self, key: &StorageKey) -> Result<Vec<u8>, BlobStoreError> {
        let path = StorePath::from(key.as_str());
        let result = self.inner.get(&path).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => BlobStoreError::NotFound(key.to_string()),
            other => BlobStoreError::DownloadFailed(other.to_string()),
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| BlobStoreError::DownloadFailed(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}
