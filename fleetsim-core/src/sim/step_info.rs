use super::Violation;
use crate::model::charging::StationSnapshot;
use crate::model::job::JobSnapshot;
use crate::model::vehicle::VehicleSnapshot;
use serde::Serialize;

/// structured per-tick state returned alongside the observation. this is
/// the full world view a policy or logger may inspect; everything in it is
/// serialized by value, so holding an old `StepInfo` never pins simulator
/// state.
#[derive(Clone, Debug, Serialize)]
pub struct StepInfo {
    /// simulated wall time at the end of the tick
    pub t: String,
    pub step_count: u64,
    pub arrived: Vec<JobSnapshot>,
    pub assigned: Vec<JobSnapshot>,
    pub in_progress: Vec<JobSnapshot>,
    pub completed: u64,
    pub rejected: u64,
    pub failed: u64,
    /// total jobs observed from demand since reset
    pub total_jobs: u64,
    pub charging_network: Vec<StationSnapshot>,
    pub fleet: Vec<VehicleSnapshot>,
    pub violations: Vec<Violation>,
}
