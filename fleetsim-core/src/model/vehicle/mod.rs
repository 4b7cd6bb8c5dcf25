mod charge_request;
mod vehicle;
mod vehicle_config;
mod vehicle_error;
mod vehicle_id;
mod vehicle_status;

pub use charge_request::ChargeRequest;
pub use vehicle::{Vehicle, VehicleSnapshot};
pub use vehicle_config::VehicleModelConfig;
pub use vehicle_error::VehicleError;
pub use vehicle_id::VehicleId;
pub use vehicle_status::VehicleStatus;
