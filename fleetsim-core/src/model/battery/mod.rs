mod battery_config;
mod battery_error;
mod battery_model;
mod multistage;

pub use battery_config::BatteryModelConfig;
pub use battery_error::BatteryError;
pub use battery_model::BatteryModel;
pub use multistage::{DegradationStage, MultiStageBattery};
