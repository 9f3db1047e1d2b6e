mod pg_pool;
mod repositories;

pub use pg_pool::create_pool;
pub use repositories::{
    InMemoryRepository, PgFileRepository, PgFindingRepository, PgInspectionRepository,
};
