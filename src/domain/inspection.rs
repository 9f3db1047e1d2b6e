use chrono::{DateTime, Utc};

use super::{InspectionId, InspectionStatus, Severity};

#[derive(Debug, Clone)]
pub struct Inspection {
    pub id: InspectionId,
    pub name: String,
    pub site_location: Option<String>,
    pub status: InspectionStatus,
    pub risk_level: Option<Severity>,
    pub narrative: Option<String>,
    pub total_findings: u32,
    pub total_files: u32,
    pub processing_started_at: Option<DateTime<Utc>>,
    pub processing_completed_at: Option<DateTime<Utc>>,
}

impl Inspection {
    pub fn new(name: String, site_location: Option<String>) -> Self {
        Self {
            id: InspectionId::new(),
            name,
            site_location,
            status: InspectionStatus::Processing,
            risk_level: None,
            narrative: None,
            total_findings: 0,
            total_files: 0,
            processing_started_at: Some(Utc::now()),
            processing_completed_at: None,
        }
    }
}

/// Progress counters written when every file of an inspection is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InspectionSettlement {
    pub total_files: u32,
    pub total_findings: u32,
    pub status: InspectionStatus,
}

/// Terminal fields computed by finalization.
#[derive(Debug, Clone, PartialEq)]
pub struct InspectionReport {
    pub status: InspectionStatus,
    pub risk_level: Severity,
    pub narrative: String,
    pub total_findings: u32,
    pub completed_at: DateTime<Utc>,
}
