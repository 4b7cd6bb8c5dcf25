use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// identifier of a fleet vehicle, equal to its index in the simulator's
/// fleet table.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct VehicleId(pub usize);

impl Display for VehicleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
