use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::application::ports::{InspectionRepository, RepositoryError};
use crate::domain::{
    Inspection, InspectionId, InspectionReport, InspectionSettlement, InspectionStatus, Severity,
};

use super::query_failed;

pub struct PgInspectionRepository {
    pool: PgPool,
}

impl PgInspectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn inspection_from_row(row: &PgRow) -> Result<Inspection, RepositoryError> {
    let status: String = row.try_get("status").map_err(query_failed)?;
    let risk_level: Option<String> = row.try_get("risk_level").map_err(query_failed)?;
    let total_findings: Option<i32> = row.try_get("total_findings").map_err(query_failed)?;
    let total_files: Option<i32> = row.try_get("total_files").map_err(query_failed)?;

    Ok(Inspection {
        id: InspectionId::from_uuid(row.try_get("id").map_err(query_failed)?),
        name: row.try_get("name").map_err(query_failed)?,
        site_location: row.try_get("site_location").map_err(query_failed)?,
        status: status
            .parse::<InspectionStatus>()
            .map_err(RepositoryError::CorruptRow)?,
        risk_level: risk_level
            .map(|r| r.parse::<Severity>())
            .transpose()
            .map_err(RepositoryError::CorruptRow)?,
        narrative: row.try_get("report_narrative").map_err(query_failed)?,
        total_findings: total_findings.unwrap_or(0).max(0) as u32,
        total_files: total_files.unwrap_or(0).max(0) as u32,
        processing_started_at: row.try_get("processing_started_at").map_err(query_failed)?,
        processing_completed_at: row
            .try_get("processing_completed_at")
            .map_err(query_failed)?,
    })
}

fn to_column(count: u32) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

#[async_trait]
impl InspectionRepository for PgInspectionRepository {
    #[instrument(skip(self), fields(inspection_id = %id.as_uuid()))]
    async fn get_by_id(&self, id: InspectionId) -> Result<Option<Inspection>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, site_location, status, risk_level, report_narrative,
                   total_findings, total_files, processing_started_at, processing_completed_at
            FROM inspections
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed)?;

        row.as_ref().map(inspection_from_row).transpose()
    }

    #[instrument(skip(self, settlement), fields(inspection_id = %id.as_uuid(), status = %settlement.status))]
    async fn settle_progress(
        &self,
        id: InspectionId,
        settlement: InspectionSettlement,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE inspections
            SET total_files = $2, total_findings = $3, status = $4, updated_at = NOW()
            WHERE id = $1 AND status = 'processing'
            "#,
        )
        .bind(id.as_uuid())
        .bind(to_column(settlement.total_files))
        .bind(to_column(settlement.total_findings))
        .bind(settlement.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self, report), fields(inspection_id = %id.as_uuid(), status = %report.status))]
    async fn apply_report(
        &self,
        id: InspectionId,
        report: &InspectionReport,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE inspections
            SET status = $2, risk_level = $3, report_narrative = $4, total_findings = $5,
                processing_completed_at = $6, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(report.status.as_str())
        .bind(report.risk_level.as_str())
        .bind(&report.narrative)
        .bind(to_column(report.total_findings))
        .bind(report.completed_at)
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("inspection {}", id.as_uuid())));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(inspection_id = %id.as_uuid()))]
    async fn mark_failed(&self, id: InspectionId) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE inspections
            SET status = 'failed', processing_completed_at = NOW(), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        Ok(())
    }
}
