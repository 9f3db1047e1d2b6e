use std::sync::Arc;

use chrono::Utc;

use crate::application::ports::{
    FileRepository, FindingRepository, InspectionRepository, RepositoryError, Summarizer,
};
use crate::domain::{
    FileStatus, Finding, Inspection, InspectionId, InspectionReport, InspectionStatus, Severity,
};

use super::truncate_chars;

pub const DEFAULT_CONTEXT_CHARS: usize = 3000;

const NO_FINDINGS_NARRATIVE: &str = "No findings were detected during this inspection. \
All uploaded files were analyzed and no defects or hazards were identified.";

/// Highest severity among the findings; unrated findings count as clear.
pub fn assess_risk(findings: &[Finding]) -> Severity {
    findings
        .iter()
        .map(|f| f.severity.unwrap_or(Severity::Clear))
        .max_by_key(Severity::weight)
        .unwrap_or(Severity::Clear)
}

/// Aggregates an inspection's findings into its risk level, narrative and
/// terminal status.
pub struct InspectionFinalizer {
    files: Arc<dyn FileRepository>,
    findings: Arc<dyn FindingRepository>,
    inspections: Arc<dyn InspectionRepository>,
    summarizer: Arc<dyn Summarizer>,
    context_chars: usize,
}

impl InspectionFinalizer {
    pub fn new(
        files: Arc<dyn FileRepository>,
        findings: Arc<dyn FindingRepository>,
        inspections: Arc<dyn InspectionRepository>,
        summarizer: Arc<dyn Summarizer>,
        context_chars: usize,
    ) -> Self {
        Self {
            files,
            findings,
            inspections,
            summarizer,
            context_chars,
        }
    }

    #[tracing::instrument(skip(self), fields(inspection_id = %inspection_id.as_uuid()))]
    pub async fn finalize(&self, inspection_id: InspectionId) -> Result<InspectionReport, FinalizerError> {
        let inspection = self
            .inspections
            .get_by_id(inspection_id)
            .await?
            .ok_or(FinalizerError::InspectionNotFound(inspection_id))?;

        let findings = self.findings.list_by_inspection(inspection_id).await?;
        let failed_files = self
            .files
            .count_by_status(inspection_id, FileStatus::Failed)
            .await?;

        let risk_level = assess_risk(&findings);
        let narrative = self.narrative(&inspection, &findings).await;
        let needs_review = findings.iter().any(|f| f.needs_review);

        let report = InspectionReport {
            status: if needs_review || failed_files > 0 {
                InspectionStatus::Review
            } else {
                InspectionStatus::Completed
            },
            risk_level,
            narrative,
            total_findings: findings.len() as u32,
            completed_at: Utc::now(),
        };

        self.inspections.apply_report(inspection_id, &report).await?;

        tracing::info!(
            risk = %report.risk_level,
            findings = report.total_findings,
            failed_files,
            status = %report.status,
            "Inspection finalized"
        );
        Ok(report)
    }

    async fn narrative(&self, inspection: &Inspection, findings: &[Finding]) -> String {
        if findings.is_empty() {
            return NO_FINDINGS_NARRATIVE.to_string();
        }

        let context = narrative_context(inspection, findings, self.context_chars);
        match self.summarizer.summarize(&context).await {
            Ok(summary) if !summary.trim().is_empty() => summary,
            Ok(_) => {
                tracing::warn!("Summarizer returned an empty narrative, using raw context");
                context
            }
            Err(e) => {
                tracing::warn!(error = %e, "Narrative generation failed, using raw context");
                context
            }
        }
    }
}

fn narrative_context(inspection: &Inspection, findings: &[Finding], max_chars: usize) -> String {
    let mut lines = Vec::with_capacity(findings.len() + 1);
    lines.push(format!(
        "Inspection: {}. Location: {}.",
        inspection.name,
        inspection.site_location.as_deref().unwrap_or("")
    ));

    for (i, finding) in findings.iter().enumerate() {
        let severity = finding.severity.map_or("unrated", |s| s.as_str());
        lines.push(format!(
            "Finding {}: {} ({}): {}",
            i + 1,
            finding.category,
            severity,
            finding.summary_text()
        ));
    }

    truncate_chars(&lines.join("\n"), max_chars).to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum FinalizerError {
    #[error("inspection not found: {}", .0.as_uuid())]
    InspectionNotFound(InspectionId),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}
