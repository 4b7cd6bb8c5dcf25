use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// lifecycle of a ride request. transitions only advance along the legal
/// edges; Complete, Rejected and Failed absorb.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// created from the demand stream, not yet picked up by the scheduler
    Arrived,
    /// a vehicle is on its way to the pickup zone
    Assigned,
    /// the passenger is on board
    InProgress,
    /// no vehicle took the job within the rejection window
    Rejected,
    /// delivered
    Complete,
    /// the servicing vehicle depleted mid-trip
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Rejected | JobStatus::Complete | JobStatus::Failed
        )
    }
}

impl Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
