use super::SchedulePolicy;
use fleetsim_core::sim::StepInfo;
use ndarray::Array2;

/// issues no charge commands at all. vehicles still service demand, since
/// the simulator assigns the closest arrived job to any commandable
/// vehicle whose charge flag is low.
pub struct IdlePolicy;

impl SchedulePolicy for IdlePolicy {
    fn name(&self) -> String {
        String::from("idle")
    }

    fn schedule(&mut self, observation: &Array2<f64>, _info: &StepInfo) -> Array2<f64> {
        Array2::<f64>::zeros(observation.dim())
    }
}
