use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::domain::FileId;

use super::file_orchestrator::{FileOrchestrator, FileOutcome};

/// Runs each file job as an independent tokio task.
#[derive(Clone)]
pub struct FileDispatcher {
    orchestrator: Arc<FileOrchestrator>,
}

impl FileDispatcher {
    pub fn new(orchestrator: Arc<FileOrchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Fire-and-forget; the handle may be awaited or dropped.
    pub fn dispatch(&self, file_id: FileId) -> JoinHandle<Option<FileOutcome>> {
        let orchestrator = Arc::clone(&self.orchestrator);
        tokio::spawn(async move {
            match orchestrator.process_file(file_id).await {
                Ok(outcome) => Some(outcome),
                Err(e) => {
                    tracing::error!(file_id = %file_id.as_uuid(), error = %e, "File job aborted");
                    None
                }
            }
        })
    }

    pub fn dispatch_all(
        &self,
        file_ids: impl IntoIterator<Item = FileId>,
    ) -> Vec<JoinHandle<Option<FileOutcome>>> {
        file_ids.into_iter().map(|id| self.dispatch(id)).collect()
    }
}
