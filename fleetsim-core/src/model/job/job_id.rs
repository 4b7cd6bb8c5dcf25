use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// identifier of a ride request. ids increase monotonically over a run,
/// including across demand stream wraparounds, so they are globally unique
/// within a simulation.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct JobId(pub u64);

impl Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
