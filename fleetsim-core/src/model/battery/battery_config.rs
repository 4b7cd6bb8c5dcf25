use super::{BatteryModel, MultiStageBattery};
use serde::{Deserialize, Serialize};
use uom::si::f64::Energy;

/// configuration key selecting a battery model implementation. additional
/// models are added here without touching the vehicle or station tick
/// loops, which only see [`BatteryModel`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatteryModelConfig {
    Multistage,
}

impl BatteryModelConfig {
    /// builds a fresh battery of the configured model at full charge.
    pub fn build(&self, capacity: Energy) -> Box<dyn BatteryModel> {
        match self {
            BatteryModelConfig::Multistage => Box::new(MultiStageBattery::new(capacity)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_from_config_string() {
        let config: BatteryModelConfig = serde_json::from_str("\"multistage\"").unwrap();
        assert_eq!(config, BatteryModelConfig::Multistage);
    }
}
