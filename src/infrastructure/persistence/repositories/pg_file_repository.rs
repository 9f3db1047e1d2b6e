use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::application::ports::{FileRepository, RepositoryError};
use crate::domain::{FileId, FileStatus, InspectionFile, InspectionId, MediaType, StorageKey};

use super::query_failed;

const FILE_COLUMNS: &str = "id, inspection_id, file_name, file_type, storage_key, status, \
                            error_message, processed_at, created_at";

pub struct PgFileRepository {
    pool: PgPool,
}

impl PgFileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn current_status(&self, id: FileId) -> Result<Option<String>, RepositoryError> {
        sqlx::query_scalar::<_, String>("SELECT status FROM files WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_failed)
    }
}

fn file_from_row(row: &PgRow) -> Result<InspectionFile, RepositoryError> {
    let status: String = row.try_get("status").map_err(query_failed)?;
    let file_type: String = row.try_get("file_type").map_err(query_failed)?;
    let storage_key: String = row.try_get("storage_key").map_err(query_failed)?;

    Ok(InspectionFile {
        id: FileId::from_uuid(row.try_get("id").map_err(query_failed)?),
        inspection_id: InspectionId::from_uuid(row.try_get("inspection_id").map_err(query_failed)?),
        file_name: row.try_get("file_name").map_err(query_failed)?,
        media_type: file_type
            .parse::<MediaType>()
            .map_err(RepositoryError::CorruptRow)?,
        storage_key: StorageKey::from_raw(storage_key),
        status: status.parse::<FileStatus>().map_err(RepositoryError::CorruptRow)?,
        error_message: row.try_get("error_message").map_err(query_failed)?,
        processed_at: row.try_get("processed_at").map_err(query_failed)?,
        created_at: row.try_get("created_at").map_err(query_failed)?,
    })
}

#[async_trait]
impl FileRepository for PgFileRepository {
    #[instrument(skip(self), fields(file_id = %id.as_uuid()))]
    async fn get_by_id(&self, id: FileId) -> Result<Option<InspectionFile>, RepositoryError> {
        let sql = format!("SELECT {FILE_COLUMNS} FROM files WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_failed)?;

        row.as_ref().map(file_from_row).transpose()
    }

    #[instrument(skip(self, error_message), fields(file_id = %id.as_uuid(), status = %status))]
    async fn update_status(
        &self,
        id: FileId,
        status: FileStatus,
        error_message: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let predecessors: Vec<String> = status
            .allowed_predecessors()
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();

        let result = sqlx::query(
            r#"
            UPDATE files
            SET status = $1,
                error_message = COALESCE($2, error_message),
                processed_at = CASE WHEN $3 THEN NOW() ELSE processed_at END
            WHERE id = $4 AND status = ANY($5)
            "#,
        )
        .bind(status.as_str())
        .bind(error_message)
        .bind(status.is_terminal())
        .bind(id.as_uuid())
        .bind(&predecessors)
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        match self.current_status(id).await? {
            None => Err(RepositoryError::NotFound(format!("file {}", id.as_uuid()))),
            Some(current) => Err(RepositoryError::InvalidTransition {
                id: id.as_uuid().to_string(),
                from: current,
                to: status.as_str().to_string(),
            }),
        }
    }

    #[instrument(skip(self), fields(inspection_id = %inspection_id.as_uuid(), status = %status))]
    async fn count_by_status(
        &self,
        inspection_id: InspectionId,
        status: FileStatus,
    ) -> Result<u32, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM files WHERE inspection_id = $1 AND status = $2",
        )
        .bind(inspection_id.as_uuid())
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(query_failed)?;

        super::to_count(count)
    }

    #[instrument(skip(self), fields(inspection_id = %inspection_id.as_uuid()))]
    async fn total_count(&self, inspection_id: InspectionId) -> Result<u32, RepositoryError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM files WHERE inspection_id = $1")
                .bind(inspection_id.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(query_failed)?;

        super::to_count(count)
    }

    #[instrument(skip(self), fields(status = %status))]
    async fn list_by_status(
        &self,
        status: FileStatus,
    ) -> Result<Vec<InspectionFile>, RepositoryError> {
        let sql = format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE status = $1 ORDER BY created_at ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(query_failed)?;

        rows.iter().map(file_from_row).collect()
    }
}
