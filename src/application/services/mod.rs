mod file_dispatcher;
mod file_orchestrator;
mod inspection_finalizer;
mod job_tracker;
mod text_budget;

pub use file_dispatcher::FileDispatcher;
pub use file_orchestrator::{AnalyzerSet, FileOrchestrator, FileOutcome, OrchestratorError};
pub use inspection_finalizer::{
    DEFAULT_CONTEXT_CHARS, FinalizerError, InspectionFinalizer, assess_risk,
};
pub use job_tracker::{FanIn, JobTracker, TrackerError};
pub use text_budget::{meaningful_len, truncate_chars};
