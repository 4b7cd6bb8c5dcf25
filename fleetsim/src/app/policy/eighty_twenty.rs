use super::SchedulePolicy;
use fleetsim_core::sim::StepInfo;
use ndarray::Array2;

/// threshold heuristic: send a vehicle to charge at full rate once its
/// state of charge drops below the low-water mark, otherwise leave it to
/// service demand.
pub struct EightyTwentyPolicy {
    pub low_soc: f64,
}

impl Default for EightyTwentyPolicy {
    fn default() -> EightyTwentyPolicy {
        EightyTwentyPolicy { low_soc: 0.2 }
    }
}

impl SchedulePolicy for EightyTwentyPolicy {
    fn name(&self) -> String {
        String::from("eightytwenty")
    }

    fn schedule(&mut self, observation: &Array2<f64>, _info: &StepInfo) -> Array2<f64> {
        let mut action = Array2::<f64>::zeros(observation.dim());
        for idx in 0..observation.nrows() {
            if observation[[idx, 1]] < self.low_soc {
                action[[idx, 0]] = 1.0;
                action[[idx, 1]] = 1.0;
            }
        }
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetsim_core::sim::StepInfo;

    fn empty_info() -> StepInfo {
        StepInfo {
            t: String::from("2020-01-01 00:00:00"),
            step_count: 0,
            arrived: vec![],
            assigned: vec![],
            in_progress: vec![],
            completed: 0,
            rejected: 0,
            failed: 0,
            total_jobs: 0,
            charging_network: vec![],
            fleet: vec![],
            violations: vec![],
        }
    }

    #[test]
    fn test_only_low_soc_vehicles_charge() {
        let mut policy = EightyTwentyPolicy::default();
        let mut observation = Array2::<f64>::zeros((3, 2));
        observation[[0, 1]] = 0.9;
        observation[[1, 1]] = 0.19;
        observation[[2, 1]] = 0.2;
        let action = policy.schedule(&observation, &empty_info());
        assert_eq!(action[[0, 0]], 0.0);
        assert_eq!(action[[1, 0]], 1.0);
        assert_eq!(action[[1, 1]], 1.0);
        // the threshold is strict
        assert_eq!(action[[2, 0]], 0.0);
    }
}
