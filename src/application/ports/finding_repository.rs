use async_trait::async_trait;

use crate::domain::{Finding, InspectionId};

use super::RepositoryError;

#[async_trait]
pub trait FindingRepository: Send + Sync {
    async fn create(&self, finding: &Finding) -> Result<(), RepositoryError>;

    async fn list_by_inspection(
        &self,
        inspection_id: InspectionId,
    ) -> Result<Vec<Finding>, RepositoryError>;

    async fn count_by_inspection(&self, inspection_id: InspectionId)
    -> Result<u32, RepositoryError>;
}
