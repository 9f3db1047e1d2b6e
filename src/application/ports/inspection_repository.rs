use async_trait::async_trait;

use crate::domain::{Inspection, InspectionId, InspectionReport, InspectionSettlement};

use super::RepositoryError;

#[async_trait]
pub trait InspectionRepository: Send + Sync {
    async fn get_by_id(&self, id: InspectionId) -> Result<Option<Inspection>, RepositoryError>;

    /// Conditionally writes the settlement counters and status. Only applies
    /// while the inspection is still `processing`; returns `true` for the one
    /// caller whose update took effect.
    async fn settle_progress(
        &self,
        id: InspectionId,
        settlement: InspectionSettlement,
    ) -> Result<bool, RepositoryError>;

    async fn apply_report(
        &self,
        id: InspectionId,
        report: &InspectionReport,
    ) -> Result<(), RepositoryError>;

    async fn mark_failed(&self, id: InspectionId) -> Result<(), RepositoryError>;
}
