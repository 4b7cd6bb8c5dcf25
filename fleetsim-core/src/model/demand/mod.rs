mod demand_config;
mod demand_error;
mod replay_demand;
mod trip_record;

pub use demand_config::DemandConfig;
pub use demand_error::DemandError;
pub use replay_demand::ReplayDemand;
pub use trip_record::TripRecord;
