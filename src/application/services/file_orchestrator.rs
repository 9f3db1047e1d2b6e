use std::sync::Arc;
use std::time::Instant;

use tracing::Instrument;

use crate::application::ports::{
    AnalysisError, BlobStore, BlobStoreError, Embedder, FileRepository, FindingRepository,
    InspectionRepository, MediaAnalyzer, RepositoryError,
};
use crate::domain::{
    Classification, Embedding, FileId, FileStatus, Finding, FindingId, InspectionFile,
    InspectionId, MediaType,
};

use super::inspection_finalizer::InspectionFinalizer;
use super::job_tracker::{FanIn, JobTracker, TrackerError};

/// One analyzer per media type that has a pipeline.
#[derive(Clone)]
pub struct AnalyzerSet {
    pub image: Arc<dyn MediaAnalyzer>,
    pub audio: Arc<dyn MediaAnalyzer>,
    pub pdf: Arc<dyn MediaAnalyzer>,
}

impl AnalyzerSet {
    pub fn for_media(&self, media_type: MediaType) -> Option<&Arc<dyn MediaAnalyzer>> {
        match media_type {
            MediaType::Image => Some(&self.image),
            MediaType::Audio => Some(&self.audio),
            MediaType::Pdf => Some(&self.pdf),
            MediaType::Other => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// `finding` is `None` for media types without a pipeline.
    Completed { finding: Option<FindingId> },
    Failed { reason: String },
    /// The file was not `pending`; nothing was done.
    Skipped,
}

/// Drives one uploaded file from `pending` to a terminal status, then
/// finalizes the inspection when this file was the last to settle.
pub struct FileOrchestrator {
    files: Arc<dyn FileRepository>,
    findings: Arc<dyn FindingRepository>,
    inspections: Arc<dyn InspectionRepository>,
    blobs: Arc<dyn BlobStore>,
    analyzers: AnalyzerSet,
    embedder: Arc<dyn Embedder>,
    tracker: JobTracker,
    finalizer: InspectionFinalizer,
}

impl FileOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        files: Arc<dyn FileRepository>,
        findings: Arc<dyn FindingRepository>,
        inspections: Arc<dyn InspectionRepository>,
        blobs: Arc<dyn BlobStore>,
        analyzers: AnalyzerSet,
        embedder: Arc<dyn Embedder>,
        tracker: JobTracker,
        finalizer: InspectionFinalizer,
    ) -> Self {
        Self {
            files,
            findings,
            inspections,
            blobs,
            analyzers,
            embedder,
            tracker,
            finalizer,
        }
    }

    pub async fn process_file(&self, file_id: FileId) -> Result<FileOutcome, OrchestratorError> {
        let span = tracing::info_span!("file_job", file_id = %file_id.as_uuid());
        self.run_job(file_id).instrument(span).await
    }

    async fn run_job(&self, file_id: FileId) -> Result<FileOutcome, OrchestratorError> {
        match self
            .tracker
            .mark_file_status(file_id, FileStatus::Processing, None)
            .await
        {
            Ok(()) => {}
            Err(TrackerError::Repository(RepositoryError::InvalidTransition { from, .. })) => {
                tracing::info!(status = %from, "File is not pending, skipping");
                return Ok(FileOutcome::Skipped);
            }
            Err(TrackerError::Repository(RepositoryError::NotFound(_))) => {
                return Err(OrchestratorError::FileNotFound(file_id));
            }
            Err(e) => return Err(e.into()),
        }

        let file = match self.files.get_by_id(file_id).await {
            Ok(Some(file)) => file,
            Ok(None) => {
                if let Err(e) = self.settle_failed(file_id, "file record not found").await {
                    tracing::warn!(error = %e, "Could not mark vanished file as failed");
                }
                return Err(OrchestratorError::FileNotFound(file_id));
            }
            Err(e) => {
                tracing::error!(error = %e, "File lookup failed");
                self.settle_failed(file_id, &format!("file lookup failed: {e}"))
                    .await?;
                self.settle_after_lookup_failure(file_id).await;
                return Err(e.into());
            }
        };
        tracing::info!(
            inspection_id = %file.inspection_id.as_uuid(),
            media_type = %file.media_type,
            file_name = %file.file_name,
            "Processing file"
        );

        let started = Instant::now();
        let outcome = match self.run_pipeline(&file).await {
            Ok(finding) => match self
                .tracker
                .mark_file_status(file_id, FileStatus::Completed, None)
                .await
            {
                Ok(()) => FileOutcome::Completed { finding },
                Err(e) => {
                    let reason = format!("could not mark file completed: {e}");
                    tracing::error!(error = %e, "Completion transition failed");
                    self.settle_failed(file_id, &reason).await?;
                    FileOutcome::Failed { reason }
                }
            },
            Err(e) => {
                let reason = e.to_string();
                tracing::error!(error = %reason, "File processing failed");
                self.settle_failed(file_id, &reason).await?;
                FileOutcome::Failed { reason }
            }
        };
        tracing::info!(
            duration_ms = started.elapsed().as_millis() as u64,
            "File pipeline finished"
        );

        self.settle_inspection(file.inspection_id).await?;
        Ok(outcome)
    }

    async fn run_pipeline(&self, file: &InspectionFile) -> Result<Option<FindingId>, PipelineError> {
        let data = self.blobs.read_bytes(&file.storage_key).await?;

        let Some(analyzer) = self.analyzers.for_media(file.media_type) else {
            tracing::info!(media_type = %file.media_type, "No analysis pipeline, completing without finding");
            return Ok(None);
        };

        let classification = analyzer.analyze(&data).await?;
        let finding = self.build_finding(file, classification).await;
        self.findings.create(&finding).await?;

        tracing::info!(
            finding_id = %finding.id.as_uuid(),
            category = %finding.category,
            confidence = finding.confidence,
            needs_review = finding.needs_review,
            "Finding created"
        );
        Ok(Some(finding.id))
    }

    async fn build_finding(&self, file: &InspectionFile, classification: Classification) -> Finding {
        let (embedding, embedding_error) = match self.embedder.embed(classification.evidence.text()).await {
            Ok(embedding) => (embedding, None),
            Err(e) => {
                tracing::warn!(error = %e, "Embedding failed, storing zero vector");
                (Embedding::zeros(self.embedder.dimensions()), Some(e.to_string()))
            }
        };

        let classification = match embedding_error {
            Some(error) => classification.with_metadata("embedding_error", error),
            None => classification,
        };

        Finding::from_classification(file.inspection_id, file.id, classification, embedding)
    }

    async fn settle_failed(&self, file_id: FileId, reason: &str) -> Result<(), TrackerError> {
        self.tracker
            .mark_file_status(file_id, FileStatus::Failed, Some(reason))
            .await
    }

    /// The file is already `failed`; a second lookup recovers the inspection
    /// id so a transient lookup error does not strand the fan-in.
    async fn settle_after_lookup_failure(&self, file_id: FileId) {
        let inspection_id = match self.files.get_by_id(file_id).await {
            Ok(Some(file)) => file.inspection_id,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(error = %e, "Inspection unknown, skipping progress recompute");
                return;
            }
        };
        if let Err(e) = self.settle_inspection(inspection_id).await {
            tracing::warn!(error = %e, "Progress recompute failed after lookup error");
        }
    }

    async fn settle_inspection(&self, inspection_id: InspectionId) -> Result<(), OrchestratorError> {
        match self.tracker.recompute_progress(inspection_id).await? {
            FanIn::Claimed(_) => {
                if let Err(e) = self.finalizer.finalize(inspection_id).await {
                    tracing::error!(
                        inspection_id = %inspection_id.as_uuid(),
                        error = %e,
                        "Finalization failed, marking inspection failed"
                    );
                    self.inspections.mark_failed(inspection_id).await?;
                }
            }
            FanIn::AlreadyClaimed => {
                tracing::debug!("Inspection already claimed by another job");
            }
            FanIn::Pending { resolved, total } => {
                tracing::debug!(resolved, total, "Inspection still in progress");
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
enum PipelineError {
    #[error("blob store: {0}")]
    Blob(#[from] BlobStoreError),
    #[error("{0}")]
    Analysis(#[from] AnalysisError),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("file not found: {}", .0.as_uuid())]
    FileNotFound(FileId),
    #[error("tracker: {0}")]
    Tracker(#[from] TrackerError),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}
