use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InspectionStatus {
    Processing,
    Review,
    Completed,
    Failed,
}

impl InspectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InspectionStatus::Processing => "processing",
            InspectionStatus::Review => "review",
            InspectionStatus::Completed => "completed",
            InspectionStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, InspectionStatus::Processing)
    }
}

impl FromStr for InspectionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(InspectionStatus::Processing),
            "review" => Ok(InspectionStatus::Review),
            "completed" => Ok(InspectionStatus::Completed),
            "failed" => Ok(InspectionStatus::Failed),
            _ => Err(format!("Invalid inspection status: {}", s)),
        }
    }
}

impl fmt::Display for InspectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
