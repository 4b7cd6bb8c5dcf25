use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// operational state of a fleet vehicle. a vehicle holds exactly one
/// status; transitions happen at tick boundaries except where a command
/// collapses one (an idle vehicle commanded to a charger in its own zone
/// still passes through ToCharge for one tick).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleStatus {
    /// parked, available for commands
    Idle,
    /// travelling to a job's pickup zone
    ToPickup,
    /// travelling to an assigned charging station
    ToCharge,
    /// at a charging station, connected or waiting for a port
    Charging,
    /// travelling to a commanded zone with no job attached
    ToLoc,
    /// carrying a passenger to the dropoff zone
    OnJob,
    /// depleted mid-trip; returning to depot and unavailable for 24 h
    Recovery,
}

impl VehicleStatus {
    /// whether the vehicle accepts `service_demand` and `charge` commands
    /// in this state.
    pub fn accepts_commands(&self) -> bool {
        matches!(
            self,
            VehicleStatus::Idle | VehicleStatus::Charging | VehicleStatus::ToCharge
        )
    }
}

impl Display for VehicleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
