use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// identifier of a node in the zone graph. zone ids come from the source
/// trip data and are 1-based; they are opaque labels, not vector indices.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ZoneId(pub u64);

impl Display for ZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
