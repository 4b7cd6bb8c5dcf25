use super::{VehicleId, VehicleStatus};
use crate::model::battery::BatteryError;
use crate::model::job::JobError;
use crate::model::region::RegionError;

#[derive(thiserror::Error, Debug)]
pub enum VehicleError {
    #[error("unknown vehicle model: {0}")]
    UnknownModel(String),
    #[error("failure building vehicle: {0}")]
    BuildError(String),
    #[error("vehicle {vehicle_id} cannot accept a {command} command while {status}")]
    NotAvailable {
        vehicle_id: VehicleId,
        command: &'static str,
        status: VehicleStatus,
    },
    #[error("vehicle {0} is servicing a job that is missing from the job table")]
    MissingJob(VehicleId),
    #[error("vehicle {0} is charging with no assigned station")]
    MissingCharger(VehicleId),
    #[error("vehicle failure from region: {source}")]
    RegionFailure {
        #[from]
        source: RegionError,
    },
    #[error("vehicle failure from job: {source}")]
    JobFailure {
        #[from]
        source: JobError,
    },
    #[error("vehicle failure from battery: {source}")]
    BatteryFailure {
        #[from]
        source: BatteryError,
    },
}
