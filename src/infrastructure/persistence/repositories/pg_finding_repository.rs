use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::application::ports::{FindingRepository, RepositoryError};
use crate::domain::{
    DefectCategory, Embedding, FileId, Finding, FindingId, InspectionId, Severity,
};

use super::query_failed;

pub struct PgFindingRepository {
    pool: PgPool,
}

impl PgFindingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn finding_from_row(row: &PgRow) -> Result<Finding, RepositoryError> {
    let category: String = row.try_get("category").map_err(query_failed)?;
    let severity: Option<String> = row.try_get("severity").map_err(query_failed)?;
    let confidence: Option<f64> = row.try_get("confidence_score").map_err(query_failed)?;
    let metadata: Option<Value> = row.try_get("extra_metadata").map_err(query_failed)?;
    let embedding: Option<String> = row.try_get("embedding_text").map_err(query_failed)?;
    let file_id: Option<uuid::Uuid> = row.try_get("file_id").map_err(query_failed)?;

    let metadata = match metadata {
        Some(Value::Object(map)) => map.into_iter().collect(),
        Some(Value::Null) | None => BTreeMap::new(),
        Some(other) => {
            return Err(RepositoryError::CorruptRow(format!(
                "extra_metadata is not an object: {other}"
            )));
        }
    };

    let embedding = match embedding {
        Some(text) => Embedding::from_vector_literal(&text)
            .ok_or_else(|| RepositoryError::CorruptRow("unreadable embedding".to_string()))?,
        None => Embedding::new(Vec::new()),
    };

    Ok(Finding {
        id: FindingId::from_uuid(row.try_get("id").map_err(query_failed)?),
        inspection_id: InspectionId::from_uuid(row.try_get("inspection_id").map_err(query_failed)?),
        file_id: file_id.map(FileId::from_uuid),
        category: DefectCategory::from_label(&category),
        severity: severity
            .map(|s| s.parse::<Severity>())
            .transpose()
            .map_err(RepositoryError::CorruptRow)?,
        confidence: confidence.unwrap_or(0.0) as f32,
        needs_review: row
            .try_get::<Option<bool>, _>("needs_review")
            .map_err(query_failed)?
            .unwrap_or(false),
        description: row
            .try_get::<Option<String>, _>("description")
            .map_err(query_failed)?
            .unwrap_or_default(),
        ai_caption: row.try_get("ai_caption").map_err(query_failed)?,
        transcription: row.try_get("transcription").map_err(query_failed)?,
        metadata,
        embedding,
        created_at: row.try_get("created_at").map_err(query_failed)?,
    })
}

#[async_trait]
impl FindingRepository for PgFindingRepository {
    #[instrument(skip(self, finding), fields(finding_id = %finding.id.as_uuid(), inspection_id = %finding.inspection_id.as_uuid()))]
    async fn create(&self, finding: &Finding) -> Result<(), RepositoryError> {
        let metadata = Value::Object(finding.metadata.clone().into_iter().collect());

        sqlx::query(
            r#"
            INSERT INTO findings (
                id, inspection_id, file_id, category, severity, confidence_score,
                needs_review, description, ai_caption, transcription, extra_metadata,
                embedding, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, CAST($12 AS vector), $13)
            "#,
        )
        .bind(finding.id.as_uuid())
        .bind(finding.inspection_id.as_uuid())
        .bind(finding.file_id.map(|id| id.as_uuid()))
        .bind(finding.category.label())
        .bind(finding.severity.map(|s| s.as_str()))
        .bind(f64::from(finding.confidence))
        .bind(finding.needs_review)
        .bind(&finding.description)
        .bind(finding.ai_caption.as_deref())
        .bind(finding.transcription.as_deref())
        .bind(metadata)
        .bind(finding.embedding.to_vector_literal())
        .bind(finding.created_at)
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        Ok(())
    }

    #[instrument(skip(self), fields(inspection_id = %inspection_id.as_uuid()))]
    async fn list_by_inspection(
        &self,
        inspection_id: InspectionId,
    ) -> Result<Vec<Finding>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, inspection_id, file_id, category, severity, confidence_score,
                   needs_review, description, ai_caption, transcription, extra_metadata,
                   embedding::text AS embedding_text, created_at
            FROM findings
            WHERE inspection_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(inspection_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed)?;

        rows.iter().map(finding_from_row).collect()
    }

    #[instrument(skip(self), fields(inspection_id = %inspection_id.as_uuid()))]
    async fn count_by_inspection(
        &self,
        inspection_id: InspectionId,
    ) -> Result<u32, RepositoryError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM findings WHERE inspection_id = $1")
                .bind(inspection_id.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(query_failed)?;

        super::to_count(count)
    }
}
