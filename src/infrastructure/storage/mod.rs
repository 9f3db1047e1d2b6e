mod in_memory_blob_store;
mod local_blob_store;

pub use in_memory_blob_store::InMemoryBlobStore;
pub use local_blob_store::LocalBlobStore;
