use super::StationId;
use crate::model::battery::BatteryError;
use crate::model::vehicle::VehicleId;

#[derive(thiserror::Error, Debug)]
pub enum ChargingError {
    #[error("failure building charging station: {0}")]
    BuildError(String),
    #[error("station {station} holds a port for vehicle {vehicle} that is not in the fleet")]
    UnknownVehicle {
        station: StationId,
        vehicle: VehicleId,
    },
    #[error("charging failure from battery: {source}")]
    BatteryFailure {
        #[from]
        source: BatteryError,
    },
}
