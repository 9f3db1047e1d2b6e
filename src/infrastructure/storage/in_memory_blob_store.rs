use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::application::ports::{BlobStore, BlobStoreError};
use crate::domain::StorageKey;

#[derive(Default)]
pub struct InMemoryBlobStore {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, key: &StorageKey, data: Vec<u8>) {
        self.objects.write().await.insert(key.as_str().to_string(), data);
    }
}

#[async_trait::async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn read_bytes(&self, key: &StorageKey) -> Result<Vec<u8>, BlobStoreError> {
        self.objects
            .read()
            .await
            .get(key.as_str())
            .cloned()
            .ok_or_else(|| BlobStoreError::NotFound(key.to_string()))
    }
}
