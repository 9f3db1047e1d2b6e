use std::sync::Arc;

use anyhow::Context;

use auditpilot::application::ports::FileRepository;
use auditpilot::application::services::{FileDispatcher, FileOutcome};
use auditpilot::bootstrap::{Stores, build_orchestrator, inference_client};
use auditpilot::config::Settings;
use auditpilot::domain::FileStatus;
use auditpilot::infrastructure::observability::{TracingConfig, init_tracing};
use auditpilot::infrastructure::persistence::{
    PgFileRepository, PgFindingRepository, PgInspectionRepository, create_pool,
};
use auditpilot::infrastructure::storage::LocalBlobStore;

/// Recovery sweep: dispatches every file still `pending` and waits for the
/// jobs to settle.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (environment, settings) = Settings::load().context("failed to load settings")?;

    init_tracing(&TracingConfig {
        environment: environment.to_string(),
        json_format: settings.logging.enable_json,
        default_filter: settings.logging.level.clone(),
    });

    let pool = create_pool(&settings.database)
        .await
        .context("failed to connect to PostgreSQL")?;

    let files: Arc<dyn FileRepository> = Arc::new(PgFileRepository::new(pool.clone()));
    let stores = Stores {
        files: Arc::clone(&files),
        findings: Arc::new(PgFindingRepository::new(pool.clone())),
        inspections: Arc::new(PgInspectionRepository::new(pool)),
        blobs: Arc::new(
            LocalBlobStore::new(settings.storage.upload_root.clone())
                .context("failed to open upload root")?,
        ),
    };

    let client = inference_client(&settings).context("failed to build inference client")?;
    let orchestrator = build_orchestrator(&settings, client, stores)
        .context("failed to build file orchestrator")?;
    let dispatcher = FileDispatcher::new(Arc::new(orchestrator));

    let pending = files
        .list_by_status(FileStatus::Pending)
        .await
        .context("failed to list pending files")?;
    tracing::info!(count = pending.len(), "Dispatching pending files");

    let handles = dispatcher.dispatch_all(pending.iter().map(|f| f.id));

    let (mut completed, mut failed, mut skipped) = (0usize, 0usize, 0usize);
    for handle in handles {
        match handle.await {
            Ok(Some(FileOutcome::Completed { .. })) => completed += 1,
            Ok(Some(FileOutcome::Skipped)) => skipped += 1,
            Ok(Some(FileOutcome::Failed { .. })) | Ok(None) => failed += 1,
            Err(e) => {
                tracing::error!(error = %e, "File job panicked");
                failed += 1;
            }
        }
    }

    tracing::info!(completed, failed, skipped, "Sweep finished");
    Ok(())
}
