mod charge_port;
mod charge_station;
mod charge_station_config;
mod charging_error;
mod station_id;

pub use charge_port::{ChargePort, PortSnapshot};
pub use charge_station::{ChargeStation, StationSnapshot};
pub use charge_station_config::ChargeStationConfig;
pub use charging_error::ChargingError;
pub use station_id::StationId;
