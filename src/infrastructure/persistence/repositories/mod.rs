mod in_memory_repository;
mod pg_file_repository;
mod pg_finding_repository;
mod pg_inspection_repository;

pub use in_memory_repository::InMemoryRepository;
pub use pg_file_repository::PgFileRepository;
pub use pg_finding_repository::PgFindingRepository;
pub use pg_inspection_repository::PgInspectionRepository;

use crate::application::ports::RepositoryError;

fn query_failed(e: sqlx::Error) -> RepositoryError {
    RepositoryError::QueryFailed(e.to_string())
}

fn to_count(count: i64) -> Result<u32, RepositoryError> {
    u32::try_from(count).map_err(|_| RepositoryError::CorruptRow(format!("count out of range: {count}")))
}
