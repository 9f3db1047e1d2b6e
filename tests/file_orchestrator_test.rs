use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::future::join_all;

use auditpilot::application::ports::{
    AnalysisError, BackendError, Embedder, EmbedderError, FileRepository, FindingRepository,
    InspectionRepository, MediaAnalyzer, RepositoryError, Summarizer, SummarizerError,
    TranscriptionError,
};
use auditpilot::application::services::{
    AnalyzerSet, DEFAULT_CONTEXT_CHARS, FileDispatcher, FileOrchestrator, FileOutcome,
    InspectionFinalizer, JobTracker, OrchestratorError,
};
use auditpilot::domain::{
    Classification, DefectCategory, EMBEDDING_DIMENSION, Embedding, Evidence, FileId, FileStatus,
    Inspection, InspectionFile, InspectionId, InspectionReport, InspectionSettlement,
    InspectionStatus, MediaType, Severity, StorageKey,
};
use auditpilot::infrastructure::persistence::InMemoryRepository;
use auditpilot::infrastructure::storage::InMemoryBlobStore;

struct MockAnalyzer {
    result: Result<Classification, String>,
    calls: AtomicUsize,
}

impl MockAnalyzer {
    fn classifying(label: &str, confidence: f32, caption: &str) -> Arc<Self> {
        let classification =
            Classification::from_ranked_labels(vec![(label.to_string(), confidence)])
                .with_description(format!("Classified as {label}."))
                .with_evidence(Evidence::Caption(caption.to_string()));
        Arc::new(Self {
            result: Ok(classification),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Err(reason.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaAnalyzer for MockAnalyzer {
    async fn analyze(&self, _data: &[u8]) -> Result<Classification, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result
            .clone()
            .map_err(|reason| AnalysisError::Transcription(TranscriptionError::InvalidResponse(reason)))
    }
}

struct MockEmbedder {
    fail: bool,
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, _text: &str) -> Result<Embedding, EmbedderError> {
        if self.fail {
            return Err(EmbedderError::Backend(BackendError::NotConfigured(
                "embedding model offline".to_string(),
            )));
        }
        Ok(Embedding::new(vec![0.5; EMBEDDING_DIMENSION]))
    }

    fn dimensions(&self) -> usize {
        EMBEDDING_DIMENSION
    }
}

#[derive(Default)]
struct MockSummarizer {
    calls: AtomicUsize,
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(&self, _context: &str) -> Result<String, SummarizerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("Summary of findings.".to_string())
    }
}

/// Delegates to the in-memory store but refuses to persist reports.
struct ReportRejectingRepository {
    inner: Arc<InMemoryRepository>,
}

#[async_trait]
impl InspectionRepository for ReportRejectingRepository {
    async fn get_by_id(&self, id: InspectionId) -> Result<Option<Inspection>, RepositoryError> {
        InspectionRepository::get_by_id(self.inner.as_ref(), id).await
    }

    async fn settle_progress(
        &self,
        id: InspectionId,
        settlement: InspectionSettlement,
    ) -> Result<bool, RepositoryError> {
        self.inner.settle_progress(id, settlement).await
    }

    async fn apply_report(
        &self,
        _id: InspectionId,
        _report: &InspectionReport,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::QueryFailed("disk full".to_string()))
    }

    async fn mark_failed(&self, id: InspectionId) -> Result<(), RepositoryError> {
        self.inner.mark_failed(id).await
    }
}

/// Delegates to the in-memory store but fails the first `failures` file
/// lookups and, when `reject_completion` is set, every move to `completed`.
struct FaultyFileRepository {
    inner: Arc<InMemoryRepository>,
    failures: usize,
    lookups: AtomicUsize,
    reject_completion: bool,
}

#[async_trait]
impl FileRepository for FaultyFileRepository {
    async fn get_by_id(&self, id: FileId) -> Result<Option<InspectionFile>, RepositoryError> {
        if self.lookups.fetch_add(1, Ordering::SeqCst) < self.failures {
            return Err(RepositoryError::QueryFailed("connection reset".to_string()));
        }
        FileRepository::get_by_id(self.inner.as_ref(), id).await
    }

    async fn update_status(
        &self,
        id: FileId,
        status: FileStatus,
        error_message: Option<&str>,
    ) -> Result<(), RepositoryError> {
        if self.reject_completion && status == FileStatus::Completed {
            return Err(RepositoryError::QueryFailed("lock timeout".to_string()));
        }
        self.inner.update_status(id, status, error_message).await
    }

    async fn count_by_status(
        &self,
        inspection_id: InspectionId,
        status: FileStatus,
    ) -> Result<u32, RepositoryError> {
        self.inner.count_by_status(inspection_id, status).await
    }

    async fn total_count(&self, inspection_id: InspectionId) -> Result<u32, RepositoryError> {
        self.inner.total_count(inspection_id).await
    }

    async fn list_by_status(
        &self,
        status: FileStatus,
    ) -> Result<Vec<InspectionFile>, RepositoryError> {
        self.inner.list_by_status(status).await
    }
}

struct Harness {
    repo: Arc<InMemoryRepository>,
    blobs: Arc<InMemoryBlobStore>,
    summarizer: Arc<MockSummarizer>,
    orchestrator: Arc<FileOrchestrator>,
    inspection_id: InspectionId,
}

struct HarnessBuilder {
    image: Arc<MockAnalyzer>,
    audio: Arc<MockAnalyzer>,
    pdf: Arc<MockAnalyzer>,
    embedder_fails: bool,
    reject_reports: bool,
    failed_lookups: usize,
    reject_completion: bool,
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self {
            image: MockAnalyzer::classifying("structural damage", 0.88, "cracked lintel"),
            audio: MockAnalyzer::classifying("fire risk", 0.7, "blocked fire exit"),
            pdf: MockAnalyzer::classifying("equipment issue", 0.9, "pump overdue"),
            embedder_fails: false,
            reject_reports: false,
            failed_lookups: 0,
            reject_completion: false,
        }
    }
}

impl HarnessBuilder {
    async fn build(self) -> Harness {
        let repo = Arc::new(InMemoryRepository::new());
        let inspection = Inspection::new("Depot inspection".to_string(), Some("Yard 3".to_string()));
        let inspection_id = inspection.id;
        repo.insert_inspection(inspection).await;

        let inspections: Arc<dyn InspectionRepository> = if self.reject_reports {
            Arc::new(ReportRejectingRepository {
                inner: Arc::clone(&repo),
            })
        } else {
            repo.clone()
        };
        let files: Arc<dyn FileRepository> = if self.failed_lookups > 0 || self.reject_completion {
            Arc::new(FaultyFileRepository {
                inner: Arc::clone(&repo),
                failures: self.failed_lookups,
                lookups: AtomicUsize::new(0),
                reject_completion: self.reject_completion,
            })
        } else {
            repo.clone()
        };
        let blobs = Arc::new(InMemoryBlobStore::new());
        let summarizer = Arc::new(MockSummarizer::default());

        let tracker = JobTracker::new(Arc::clone(&files), repo.clone(), Arc::clone(&inspections));
        let finalizer = InspectionFinalizer::new(
            repo.clone(),
            repo.clone(),
            Arc::clone(&inspections),
            summarizer.clone(),
            DEFAULT_CONTEXT_CHARS,
        );
        let orchestrator = FileOrchestrator::new(
            files,
            repo.clone(),
            inspections,
            blobs.clone(),
            AnalyzerSet {
                image: self.image,
                audio: self.audio,
                pdf: self.pdf,
            },
            Arc::new(MockEmbedder {
                fail: self.embedder_fails,
            }),
            tracker,
            finalizer,
        );

        Harness {
            repo,
            blobs,
            summarizer,
            orchestrator: Arc::new(orchestrator),
            inspection_id,
        }
    }
}

impl Harness {
    async fn upload(&self, name: &str, media_type: MediaType) -> FileId {
        let file_id = self.register(name, media_type).await;
        let key = self.repo.file(file_id).await.unwrap().storage_key;
        self.blobs.insert(&key, b"payload".to_vec()).await;
        file_id
    }

    /// A file record whose bytes never reached the blob store.
    async fn register(&self, name: &str, media_type: MediaType) -> FileId {
        let file = InspectionFile::new(
            self.inspection_id,
            name.to_string(),
            media_type,
            StorageKey::new("org-7", &self.inspection_id, name),
        );
        let file_id = file.id;
        self.repo.insert_file(file).await;
        file_id
    }

    async fn inspection(&self) -> Inspection {
        self.repo.inspection(self.inspection_id).await.unwrap()
    }
}

#[tokio::test]
async fn given_single_image_when_processed_then_finding_stored_and_inspection_finalized() {
    let harness = HarnessBuilder::default().build().await;
    let file_id = harness.upload("lintel.jpg", MediaType::Image).await;

    let outcome = harness.orchestrator.process_file(file_id).await.unwrap();

    let FileOutcome::Completed { finding: Some(_) } = outcome else {
        panic!("expected a finding, got {outcome:?}");
    };
    let findings = harness
        .repo
        .list_by_inspection(harness.inspection_id)
        .await
        .unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].category, DefectCategory::StructuralDamage);
    assert_eq!(findings[0].file_id, Some(file_id));
    assert_eq!(findings[0].ai_caption.as_deref(), Some("cracked lintel"));
    assert_eq!(findings[0].embedding.dimensions(), EMBEDDING_DIMENSION);
    assert!(findings[0].metadata.contains_key("label_scores"));

    let file = harness.repo.file(file_id).await.unwrap();
    assert_eq!(file.status, FileStatus::Completed);
    assert!(file.processed_at.is_some());

    let inspection = harness.inspection().await;
    assert_eq!(inspection.status, InspectionStatus::Completed);
    assert_eq!(inspection.risk_level, Some(Severity::Critical));
    assert_eq!(inspection.total_files, 1);
    assert_eq!(inspection.total_findings, 1);
    assert_eq!(inspection.narrative.as_deref(), Some("Summary of findings."));
}

#[tokio::test]
async fn given_missing_blob_when_processed_then_file_failed_and_inspection_needs_review() {
    let harness = HarnessBuilder::default().build().await;
    let file_id = harness.register("vanished.jpg", MediaType::Image).await;

    let outcome = harness.orchestrator.process_file(file_id).await.unwrap();

    assert!(matches!(outcome, FileOutcome::Failed { .. }));
    let file = harness.repo.file(file_id).await.unwrap();
    assert_eq!(file.status, FileStatus::Failed);
    assert!(file.error_message.unwrap().contains("not found"));

    let inspection = harness.inspection().await;
    assert_eq!(inspection.status, InspectionStatus::Review);
    assert_eq!(inspection.risk_level, Some(Severity::Clear));
    assert_eq!(inspection.total_findings, 0);
}

#[tokio::test]
async fn given_unsupported_media_when_processed_then_completed_without_finding() {
    let builder = HarnessBuilder::default();
    let image = Arc::clone(&builder.image);
    let harness = builder.build().await;
    let file_id = harness.upload("readme.txt", MediaType::Other).await;

    let outcome = harness.orchestrator.process_file(file_id).await.unwrap();

    assert_eq!(outcome, FileOutcome::Completed { finding: None });
    assert_eq!(image.calls(), 0);
    let inspection = harness.inspection().await;
    assert_eq!(inspection.status, InspectionStatus::Completed);
    assert_eq!(inspection.risk_level, Some(Severity::Clear));
    assert_eq!(harness.summarizer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn given_file_already_processed_when_processed_again_then_skipped() {
    let builder = HarnessBuilder::default();
    let image = Arc::clone(&builder.image);
    let harness = builder.build().await;
    let file_id = harness.upload("lintel.jpg", MediaType::Image).await;
    harness.orchestrator.process_file(file_id).await.unwrap();

    let outcome = harness.orchestrator.process_file(file_id).await.unwrap();

    assert_eq!(outcome, FileOutcome::Skipped);
    assert_eq!(image.calls(), 1);
    assert_eq!(
        harness
            .repo
            .count_by_inspection(harness.inspection_id)
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn given_embedding_failure_when_processed_then_zero_vector_with_error_metadata() {
    let harness = HarnessBuilder {
        embedder_fails: true,
        ..HarnessBuilder::default()
    }
    .build()
    .await;
    let file_id = harness.upload("memo.pdf", MediaType::Pdf).await;

    let outcome = harness.orchestrator.process_file(file_id).await.unwrap();

    assert!(matches!(outcome, FileOutcome::Completed { finding: Some(_) }));
    let findings = harness
        .repo
        .list_by_inspection(harness.inspection_id)
        .await
        .unwrap();
    assert!(findings[0].embedding.is_zero());
    assert_eq!(findings[0].embedding.dimensions(), EMBEDDING_DIMENSION);
    assert!(findings[0].metadata.contains_key("embedding_error"));
}

#[tokio::test]
async fn given_report_cannot_be_saved_when_last_file_settles_then_inspection_failed() {
    let harness = HarnessBuilder {
        reject_reports: true,
        ..HarnessBuilder::default()
    }
    .build()
    .await;
    let file_id = harness.upload("lintel.jpg", MediaType::Image).await;

    let outcome = harness.orchestrator.process_file(file_id).await.unwrap();

    assert!(matches!(outcome, FileOutcome::Completed { .. }));
    assert_eq!(harness.inspection().await.status, InspectionStatus::Failed);
}

#[tokio::test]
async fn given_file_lookup_error_when_processed_then_file_failed_and_inspection_settled() {
    let harness = HarnessBuilder {
        failed_lookups: 1,
        ..HarnessBuilder::default()
    }
    .build()
    .await;
    let file_id = harness.upload("lintel.jpg", MediaType::Image).await;

    let result = harness.orchestrator.process_file(file_id).await;

    assert!(matches!(
        result,
        Err(OrchestratorError::Repository(RepositoryError::QueryFailed(_)))
    ));
    let file = harness.repo.file(file_id).await.unwrap();
    assert_eq!(file.status, FileStatus::Failed);
    assert!(file.error_message.unwrap().contains("connection reset"));
    assert_eq!(harness.inspection().await.status, InspectionStatus::Review);
}

#[tokio::test]
async fn given_file_lookup_keeps_failing_when_processed_then_file_still_reaches_failed() {
    let harness = HarnessBuilder {
        failed_lookups: usize::MAX,
        ..HarnessBuilder::default()
    }
    .build()
    .await;
    let file_id = harness.upload("lintel.jpg", MediaType::Image).await;

    let result = harness.orchestrator.process_file(file_id).await;

    assert!(result.is_err());
    assert_eq!(harness.repo.file(file_id).await.unwrap().status, FileStatus::Failed);
    assert_eq!(harness.summarizer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn given_completion_cannot_be_recorded_when_processed_then_file_failed_and_inspection_settled() {
    let harness = HarnessBuilder {
        reject_completion: true,
        ..HarnessBuilder::default()
    }
    .build()
    .await;
    let file_id = harness.upload("lintel.jpg", MediaType::Image).await;

    let outcome = harness.orchestrator.process_file(file_id).await.unwrap();

    let FileOutcome::Failed { reason } = outcome else {
        panic!("expected failure, got {outcome:?}");
    };
    assert!(reason.contains("lock timeout"));
    assert_eq!(harness.repo.file(file_id).await.unwrap().status, FileStatus::Failed);
    assert_eq!(harness.inspection().await.status, InspectionStatus::Review);
}

#[tokio::test]
async fn given_unknown_file_when_processed_then_file_not_found() {
    let harness = HarnessBuilder::default().build().await;

    let result = harness.orchestrator.process_file(FileId::new()).await;

    assert!(matches!(result, Err(OrchestratorError::FileNotFound(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn given_three_files_dispatched_concurrently_when_one_fails_then_finalized_once_for_review() {
    let harness = HarnessBuilder {
        audio: MockAnalyzer::failing("garbled audio"),
        ..HarnessBuilder::default()
    }
    .build()
    .await;
    let ids = vec![
        harness.upload("wall.jpg", MediaType::Image).await,
        harness.upload("note.m4a", MediaType::Audio).await,
        harness.upload("log.pdf", MediaType::Pdf).await,
    ];
    let dispatcher = FileDispatcher::new(Arc::clone(&harness.orchestrator));

    let outcomes: Vec<FileOutcome> = join_all(dispatcher.dispatch_all(ids))
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    let completed = outcomes
        .iter()
        .filter(|o| matches!(o, FileOutcome::Completed { .. }))
        .count();
    let failed = outcomes
        .iter()
        .filter(|o| matches!(o, FileOutcome::Failed { .. }))
        .count();
    assert_eq!((completed, failed), (2, 1));

    let inspection = harness.inspection().await;
    assert_eq!(inspection.status, InspectionStatus::Review);
    assert_eq!(inspection.total_files, 3);
    assert_eq!(inspection.total_findings, 2);
    assert_eq!(inspection.risk_level, Some(Severity::Critical));
    assert_eq!(harness.summarizer.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        harness
            .repo
            .count_by_status(harness.inspection_id, FileStatus::Failed)
            .await
            .unwrap(),
        1
    );
}
