use std::sync::Arc;

use crate::application::ports::{
    FileRepository, FindingRepository, InspectionRepository, RepositoryError,
};
use crate::domain::{FileId, FileStatus, InspectionId, InspectionSettlement, InspectionStatus};

/// Result of recomputing an inspection's progress after a file settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FanIn {
    /// Some files are still pending or processing.
    Pending { resolved: u32, total: u32 },
    /// This caller settled the inspection and must run finalization.
    Claimed(InspectionSettlement),
    /// Every file is terminal but another caller already settled it.
    AlreadyClaimed,
}

pub struct JobTracker {
    files: Arc<dyn FileRepository>,
    findings: Arc<dyn FindingRepository>,
    inspections: Arc<dyn InspectionRepository>,
}

impl JobTracker {
    pub fn new(
        files: Arc<dyn FileRepository>,
        findings: Arc<dyn FindingRepository>,
        inspections: Arc<dyn InspectionRepository>,
    ) -> Self {
        Self {
            files,
            findings,
            inspections,
        }
    }

    pub async fn mark_file_status(
        &self,
        file_id: FileId,
        status: FileStatus,
        error_message: Option<&str>,
    ) -> Result<(), TrackerError> {
        tracing::debug!(file_id = %file_id.as_uuid(), status = %status, "File status transition");
        self.files
            .update_status(file_id, status, error_message)
            .await
            .map_err(TrackerError::from)
    }

    /// Counts terminal files and, once all are terminal, tries to settle the
    /// inspection. Only one concurrent caller gets `FanIn::Claimed`.
    pub async fn recompute_progress(&self, inspection_id: InspectionId) -> Result<FanIn, TrackerError> {
        let total = self.files.total_count(inspection_id).await?;
        let completed = self
            .files
            .count_by_status(inspection_id, FileStatus::Completed)
            .await?;
        let failed = self
            .files
            .count_by_status(inspection_id, FileStatus::Failed)
            .await?;
        let resolved = completed + failed;

        if total == 0 || resolved < total {
            tracing::debug!(
                inspection_id = %inspection_id.as_uuid(),
                resolved,
                total,
                "Inspection still has unresolved files"
            );
            return Ok(FanIn::Pending { resolved, total });
        }

        let settlement = InspectionSettlement {
            total_files: total,
            total_findings: self.findings.count_by_inspection(inspection_id).await?,
            status: if failed == 0 {
                InspectionStatus::Completed
            } else {
                InspectionStatus::Review
            },
        };

        if self
            .inspections
            .settle_progress(inspection_id, settlement)
            .await?
        {
            tracing::info!(
                inspection_id = %inspection_id.as_uuid(),
                total_files = total,
                failed,
                "All files resolved, inspection claimed for finalization"
            );
            Ok(FanIn::Claimed(settlement))
        } else {
            Ok(FanIn::AlreadyClaimed)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}
