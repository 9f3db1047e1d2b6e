use async_trait::async_trait;

use crate::domain::{FileId, FileStatus, InspectionFile, InspectionId};

use super::RepositoryError;

#[async_trait]
pub trait FileRepository: Send + Sync {
    async fn get_by_id(&self, id: FileId) -> Result<Option<InspectionFile>, RepositoryError>;

    /// Moves a file to `status` only from one of `status.allowed_predecessors()`.
    /// Terminal statuses stamp `processed_at`. Fails with `NotFound` for an
    /// unknown file and `InvalidTransition` for an illegal move.
    async fn update_status(
        &self,
        id: FileId,
        status: FileStatus,
        error_message: Option<&str>,
    ) -> Result<(), RepositoryError>;

    async fn count_by_status(
        &self,
        inspection_id: InspectionId,
        status: FileStatus,
    ) -> Result<u32, RepositoryError>;

    async fn total_count(&self, inspection_id: InspectionId) -> Result<u32, RepositoryError>;

    async fn list_by_status(&self, status: FileStatus)
    -> Result<Vec<InspectionFile>, RepositoryError>;
}
