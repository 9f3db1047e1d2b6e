use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::application::ports::{
    FileRepository, FindingRepository, InspectionRepository, RepositoryError,
};
use crate::domain::{
    FileId, FileStatus, Finding, Inspection, InspectionFile, InspectionId, InspectionReport,
    InspectionSettlement, InspectionStatus,
};

#[derive(Default)]
struct State {
    inspections: HashMap<InspectionId, Inspection>,
    files: HashMap<FileId, InspectionFile>,
    findings: Vec<Finding>,
}

/// Process-local persistence implementing every repository port behind one
/// lock, so status transitions and the fan-in claim are atomic.
#[derive(Default)]
pub struct InMemoryRepository {
    state: Mutex<State>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_inspection(&self, inspection: Inspection) {
        self.state
            .lock()
            .await
            .inspections
            .insert(inspection.id, inspection);
    }

    pub async fn insert_file(&self, file: InspectionFile) {
        self.state.lock().await.files.insert(file.id, file);
    }

    pub async fn inspection(&self, id: InspectionId) -> Option<Inspection> {
        self.state.lock().await.inspections.get(&id).cloned()
    }

    pub async fn file(&self, id: FileId) -> Option<InspectionFile> {
        self.state.lock().await.files.get(&id).cloned()
    }
}

#[async_trait]
impl FileRepository for InMemoryRepository {
    async fn get_by_id(&self, id: FileId) -> Result<Option<InspectionFile>, RepositoryError> {
        Ok(self.file(id).await)
    }

    async fn update_status(
        &self,
        id: FileId,
        status: FileStatus,
        error_message: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        let file = state
            .files
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(format!("file {}", id.as_uuid())))?;

        if !file.status.can_transition_to(status) {
            return Err(RepositoryError::InvalidTransition {
                id: id.as_uuid().to_string(),
                from: file.status.as_str().to_string(),
                to: status.as_str().to_string(),
            });
        }

        file.status = status;
        if let Some(message) = error_message {
            file.error_message = Some(message.to_string());
        }
        if status.is_terminal() {
            file.processed_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn count_by_status(
        &self,
        inspection_id: InspectionId,
        status: FileStatus,
    ) -> Result<u32, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .files
            .values()
            .filter(|f| f.inspection_id == inspection_id && f.status == status)
            .count() as u32)
    }

    async fn total_count(&self, inspection_id: InspectionId) -> Result<u32, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .files
            .values()
            .filter(|f| f.inspection_id == inspection_id)
            .count() as u32)
    }

    async fn list_by_status(
        &self,
        status: FileStatus,
    ) -> Result<Vec<InspectionFile>, RepositoryError> {
        let state = self.state.lock().await;
        let mut files: Vec<InspectionFile> = state
            .files
            .values()
            .filter(|f| f.status == status)
            .cloned()
            .collect();
        files.sort_by_key(|f| f.created_at);
        Ok(files)
    }
}

#[async_trait]
impl FindingRepository for InMemoryRepository {
    async fn create(&self, finding: &Finding) -> Result<(), RepositoryError> {
        self.state.lock().await.findings.push(finding.clone());
        Ok(())
    }

    async fn list_by_inspection(
        &self,
        inspection_id: InspectionId,
    ) -> Result<Vec<Finding>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .findings
            .iter()
            .filter(|f| f.inspection_id == inspection_id)
            .cloned()
            .collect())
    }

    async fn count_by_inspection(
        &self,
        inspection_id: InspectionId,
    ) -> Result<u32, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .findings
            .iter()
            .filter(|f| f.inspection_id == inspection_id)
            .count() as u32)
    }
}

#[async_trait]
impl InspectionRepository for InMemoryRepository {
    async fn get_by_id(&self, id: InspectionId) -> Result<Option<Inspection>, RepositoryError> {
        Ok(self.inspection(id).await)
    }

    async fn settle_progress(
        &self,
        id: InspectionId,
        settlement: InspectionSettlement,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.state.lock().await;
        match state.inspections.get_mut(&id) {
            Some(inspection) if inspection.status == InspectionStatus::Processing => {
                inspection.total_files = settlement.total_files;
                inspection.total_findings = settlement.total_findings;
                inspection.status = settlement.status;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn apply_report(
        &self,
        id: InspectionId,
        report: &InspectionReport,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        let inspection = state
            .inspections
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(format!("inspection {}", id.as_uuid())))?;

        inspection.status = report.status;
        inspection.risk_level = Some(report.risk_level);
        inspection.narrative = Some(report.narrative.clone());
        inspection.total_findings = report.total_findings;
        inspection.processing_completed_at = Some(report.completed_at);
        Ok(())
    }

    async fn mark_failed(&self, id: InspectionId) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        if let Some(inspection) = state.inspections.get_mut(&id) {
            inspection.status = InspectionStatus::Failed;
            inspection.processing_completed_at = Some(Utc::now());
        }
        Ok(())
    }
}
