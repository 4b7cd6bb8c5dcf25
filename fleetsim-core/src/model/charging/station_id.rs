use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// identifier of a charging station, equal to its index in the simulator's
/// station table.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct StationId(pub usize);

impl Display for StationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
