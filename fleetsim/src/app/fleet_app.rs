use super::fleet_app_error::FleetAppError;
use super::policy::SchedulePolicy;
use super::run_log::RunLog;
use fleetsim_core::sim::{SimulationConfig, Simulator};
use log::info;

/// totals of one finished episode.
#[derive(Clone, Copy, Debug)]
pub struct EpisodeSummary {
    pub steps: u64,
    pub completed: u64,
    pub rejected: u64,
    pub failed: u64,
    pub final_reward: f64,
    /// true when the episode reached the end of the simulated window,
    /// false when it was truncated by the step limit
    pub terminated: bool,
}

/// the episode runner: a simulator, a policy driving it, and an optional
/// per-tick run log.
pub struct FleetApp {
    simulator: Simulator,
    policy: Box<dyn SchedulePolicy>,
    run_log: Option<RunLog>,
}

impl FleetApp {
    pub fn new(
        config: SimulationConfig,
        policy: Box<dyn SchedulePolicy>,
        run_log: Option<RunLog>,
    ) -> Result<FleetApp, FleetAppError> {
        let simulator = Simulator::new(config)?;
        Ok(FleetApp {
            simulator,
            policy,
            run_log,
        })
    }

    /// runs one episode to termination or truncation.
    pub fn run(&mut self, seed: Option<u64>) -> Result<EpisodeSummary, FleetAppError> {
        let (mut observation, mut step_info) = self.simulator.reset(seed)?;
        info!("running policy '{}'", self.policy.name());
        loop {
            let action = self.policy.schedule(&observation, &step_info);
            let outcome = self.simulator.step(&action)?;
            if let Some(log) = self.run_log.as_mut() {
                log.write(&outcome.info)?;
            }
            observation = outcome.observation;
            step_info = outcome.info;

            if step_info.step_count % 1000 == 0 {
                info!(
                    "step {}: {} completed, {} rejected, {} failed",
                    step_info.step_count,
                    step_info.completed,
                    step_info.rejected,
                    step_info.failed
                );
            }
            if outcome.terminated || outcome.truncated {
                return Ok(EpisodeSummary {
                    steps: step_info.step_count,
                    completed: step_info.completed,
                    rejected: step_info.rejected,
                    failed: step_info.failed,
                    final_reward: outcome.reward,
                    terminated: outcome.terminated,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::policy;
    use fleetsim_core::model::battery::BatteryModelConfig;
    use fleetsim_core::model::demand::DemandConfig;
    use fleetsim_core::model::region::ZoneGraphConfig;
    use fleetsim_core::model::vehicle::VehicleModelConfig;
    use fleetsim_core::sim::{FleetConfig, RewardConfig};
    use std::path::PathBuf;

    fn core_fixture(parts: &[&str]) -> PathBuf {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("fleetsim-core")
            .join("src")
            .join("model");
        for part in parts {
            path = path.join(part);
        }
        path
    }

    fn config() -> SimulationConfig {
        SimulationConfig {
            start_t: String::from("2020-01-01 00:00:00"),
            end_t: String::from("2020-01-01 02:00:00"),
            delta_t: 300,
            max_steps: 1000,
            ambient_celsius: 25.0,
            city: ZoneGraphConfig {
                input_file: core_fixture(&["region", "test", "zone_pairs.csv"]),
            },
            demand: DemandConfig {
                input_file: core_fixture(&["demand", "test", "trips.csv"]),
            },
            fleet: FleetConfig {
                size: 2,
                vehicle: VehicleModelConfig::Named(String::from("byd e6")),
                battery_model: BatteryModelConfig::Multistage,
                max_charge_rate_kw: 20.0,
            },
            charging_stations: vec![],
            reward: RewardConfig::default(),
        }
    }

    #[test]
    fn test_episode_runs_to_termination() {
        let policy = policy::from_name("idle").unwrap();
        let mut app = FleetApp::new(config(), policy, None).unwrap();
        let summary = app.run(Some(7)).unwrap();
        // two hours at five-minute ticks
        assert_eq!(summary.steps, 24);
        assert!(summary.terminated);
        assert!(summary.completed > 0);
    }

    #[test]
    fn test_run_log_rows_match_steps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("episode.csv");
        let policy = policy::from_name("eightytwenty").unwrap();
        let run_log = RunLog::create(&path, 2).unwrap();
        let mut app = FleetApp::new(config(), policy, Some(run_log)).unwrap();
        let summary = app.run(None).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count() as u64, summary.steps + 1);
    }
}
