#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("query failed: {0}")]
    QueryFailed(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("illegal status transition for {id}: {from} -> {to}")]
    InvalidTransition { id: String, from: String, to: String },
    #[error("corrupt row: {0}")]
    CorruptRow(String),
}
