use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a job run. Transitions only ever move forward.
///
/// ```text
/// Idle -> Starting -> Started -> Stopping -> Completed
///            |           |
///            +-----------+------> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum JobStatus {
    Idle = 0,
    Starting = 1,
    Started = 2,
    Stopping = 3,
    Completed = 4,
    Failed = 5,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Idle => "IDLE",
            JobStatus::Starting => "STARTING",
            JobStatus::Started => "STARTED",
            JobStatus::Stopping => "STOPPING",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Idle, JobStatus::Starting)
                | (JobStatus::Starting, JobStatus::Started)
                | (JobStatus::Starting, JobStatus::Failed)
                | (JobStatus::Started, JobStatus::Stopping)
                | (JobStatus::Started, JobStatus::Failed)
                | (JobStatus::Stopping, JobStatus::Completed)
        )
    }

    pub(crate) fn from_u8(value: u8) -> JobStatus {
        match value {
            1 => JobStatus::Starting,
            2 => JobStatus::Started,
            3 => JobStatus::Stopping,
            4 => JobStatus::Completed,
            5 => JobStatus::Failed,
            _ => JobStatus::Idle,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
