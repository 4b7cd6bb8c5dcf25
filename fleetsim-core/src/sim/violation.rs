use crate::model::charging::StationId;
use crate::model::job::JobId;
use crate::model::vehicle::VehicleId;
use serde::Serialize;

/// a recoverable domain violation observed while applying a policy action.
/// violations are recorded in the tick's `info` payload and the offending
/// command is skipped; the simulation continues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum Violation {
    /// a charge command was issued but the network has no stations
    NoChargerAvailable { vehicle: VehicleId },
    /// a charge request targeted a station index outside the network
    UnknownStation {
        vehicle: VehicleId,
        station: StationId,
    },
    /// a command referenced a job that is not in the live job tables
    UnknownJob { vehicle: VehicleId, job: JobId },
}
