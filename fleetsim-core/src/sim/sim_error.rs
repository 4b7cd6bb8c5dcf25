use crate::model::battery::BatteryError;
use crate::model::charging::ChargingError;
use crate::model::demand::DemandError;
use crate::model::job::JobError;
use crate::model::region::RegionError;
use crate::model::vehicle::VehicleError;

#[derive(thiserror::Error, Debug)]
pub enum SimulatorError {
    #[error("invalid simulation configuration: {0}")]
    ConfigurationError(String),
    #[error("invalid action: {0}")]
    InvalidAction(String),
    #[error("simulation failure from region: {source}")]
    RegionFailure {
        #[from]
        source: RegionError,
    },
    #[error("simulation failure from vehicle: {source}")]
    VehicleFailure {
        #[from]
        source: VehicleError,
    },
    #[error("simulation failure from job: {source}")]
    JobFailure {
        #[from]
        source: JobError,
    },
    #[error("simulation failure from charging network: {source}")]
    ChargingFailure {
        #[from]
        source: ChargingError,
    },
    #[error("simulation failure from demand stream: {source}")]
    DemandFailure {
        #[from]
        source: DemandError,
    },
    #[error("simulation failure from battery: {source}")]
    BatteryFailure {
        #[from]
        source: BatteryError,
    },
}
