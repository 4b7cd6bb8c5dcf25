mod eighty_twenty;
mod idle;

pub use eighty_twenty::EightyTwentyPolicy;
pub use idle::IdlePolicy;

use super::fleet_app_error::FleetAppError;
use fleetsim_core::sim::StepInfo;
use ndarray::Array2;

/// a scheduling policy: consumes the fleet observation and the structured
/// tick info, produces the `N x 2` `(charge_flag, rate)` action.
pub trait SchedulePolicy {
    fn name(&self) -> String;

    fn schedule(&mut self, observation: &Array2<f64>, info: &StepInfo) -> Array2<f64>;
}

/// resolves a policy by its CLI name.
pub fn from_name(name: &str) -> Result<Box<dyn SchedulePolicy>, FleetAppError> {
    match name.to_lowercase().as_str() {
        "idle" => Ok(Box::new(IdlePolicy)),
        "eightytwenty" | "80-20" => Ok(Box::new(EightyTwentyPolicy::default())),
        _ => Err(FleetAppError::BuildFailure(format!(
            "unknown policy '{}'; expected one of: idle, eightytwenty",
            name
        ))),
    }
}
