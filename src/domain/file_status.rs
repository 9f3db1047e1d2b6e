use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Pending => "pending",
            FileStatus::Processing => "processing",
            FileStatus::Completed => "completed",
            FileStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, FileStatus::Completed | FileStatus::Failed)
    }

    /// Statuses a file may be in immediately before moving to `self`.
    ///
    /// `pending -> processing -> {completed, failed}`; terminal statuses
    /// accept no further transitions and nothing moves back to `pending`.
    pub fn allowed_predecessors(&self) -> &'static [FileStatus] {
        match self {
            FileStatus::Pending => &[],
            FileStatus::Processing => &[FileStatus::Pending],
            FileStatus::Completed | FileStatus::Failed => &[FileStatus::Processing],
        }
    }

    pub fn can_transition_to(&self, next: FileStatus) -> bool {
        next.allowed_predecessors().contains(self)
    }
}

impl FromStr for FileStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(FileStatus::Pending),
            "processing" => Ok(FileStatus::Processing),
            "completed" => Ok(FileStatus::Completed),
            "failed" => Ok(FileStatus::Failed),
            _ => Err(format!("Invalid file status: {}", s)),
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
