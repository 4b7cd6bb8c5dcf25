use super::SimulatorError;
use crate::model::battery::BatteryModelConfig;
use crate::model::charging::ChargeStationConfig;
use crate::model::demand::DemandConfig;
use crate::model::region::ZoneGraphConfig;
use crate::model::vehicle::VehicleModelConfig;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%m/%d/%Y %I:%M:%S %p"];

fn default_max_steps() -> u64 {
    1000
}

fn default_ambient() -> f64 {
    25.0
}

fn default_max_charge_rate() -> f64 {
    20.0
}

fn default_degradation_weight() -> f64 {
    1.0
}

/// full configuration of one simulation run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// start of the simulated window
    pub start_t: String,
    /// end of the simulated window; reaching it terminates the episode
    pub end_t: String,
    /// tick length in seconds
    pub delta_t: u64,
    /// step count past which the episode reports truncation
    #[serde(default = "default_max_steps")]
    pub max_steps: u64,
    /// ambient temperature fed to the battery models, degrees Celsius
    #[serde(default = "default_ambient")]
    pub ambient_celsius: f64,
    /// region map source
    pub city: ZoneGraphConfig,
    /// trip log source
    pub demand: DemandConfig,
    pub fleet: FleetConfig,
    #[serde(default)]
    pub charging_stations: Vec<ChargeStationConfig>,
    #[serde(default)]
    pub reward: RewardConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FleetConfig {
    pub size: usize,
    pub vehicle: VehicleModelConfig,
    pub battery_model: BatteryModelConfig,
    /// kW corresponding to an action rate entry of 1.0
    #[serde(default = "default_max_charge_rate")]
    pub max_charge_rate_kw: f64,
}

/// reward shaping knobs. the canonical reward is
/// `completed + degradation_weight * sum(soh)`; the recovery penalty is an
/// optional hook, zero by default.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RewardConfig {
    #[serde(default = "default_degradation_weight")]
    pub degradation_weight: f64,
    #[serde(default)]
    pub recovery_penalty: f64,
}

impl Default for RewardConfig {
    fn default() -> RewardConfig {
        RewardConfig {
            degradation_weight: default_degradation_weight(),
            recovery_penalty: 0.0,
        }
    }
}

impl SimulationConfig {
    /// parses and validates the simulation window, returning
    /// `(start, end)`.
    pub fn window(&self) -> Result<(NaiveDateTime, NaiveDateTime), SimulatorError> {
        let start = parse_timestamp(&self.start_t).ok_or_else(|| {
            SimulatorError::ConfigurationError(format!("unparsable start_t: {}", self.start_t))
        })?;
        let end = parse_timestamp(&self.end_t).ok_or_else(|| {
            SimulatorError::ConfigurationError(format!("unparsable end_t: {}", self.end_t))
        })?;
        if end <= start {
            return Err(SimulatorError::ConfigurationError(format!(
                "simulation window is empty: {} .. {}",
                start, end
            )));
        }
        if self.delta_t == 0 {
            return Err(SimulatorError::ConfigurationError(String::from(
                "delta_t must be at least one second",
            )));
        }
        Ok((start, end))
    }
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value.trim(), fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(start: &str, end: &str, delta_t: u64) -> SimulationConfig {
        SimulationConfig {
            start_t: String::from(start),
            end_t: String::from(end),
            delta_t,
            max_steps: default_max_steps(),
            ambient_celsius: default_ambient(),
            city: ZoneGraphConfig {
                input_file: "map.csv".into(),
            },
            demand: DemandConfig {
                input_file: "trips.csv".into(),
            },
            fleet: FleetConfig {
                size: 1,
                vehicle: VehicleModelConfig::Named(String::from("byd e6")),
                battery_model: BatteryModelConfig::Multistage,
                max_charge_rate_kw: default_max_charge_rate(),
            },
            charging_stations: vec![],
            reward: RewardConfig::default(),
        }
    }

    #[test]
    fn test_window_accepts_both_timestamp_dialects() {
        let c = config("2020-01-01 00:00:00", "01/02/2020 12:00:00 AM", 300);
        let (start, end) = c.window().unwrap();
        assert!(end > start);
    }

    #[test]
    fn test_window_rejects_empty_and_backwards() {
        let c = config("2020-01-02 00:00:00", "2020-01-01 00:00:00", 300);
        assert!(matches!(
            c.window(),
            Err(SimulatorError::ConfigurationError(_))
        ));
        let c = config("2020-01-01 00:00:00", "2020-01-02 00:00:00", 0);
        assert!(matches!(
            c.window(),
            Err(SimulatorError::ConfigurationError(_))
        ));
    }
}
