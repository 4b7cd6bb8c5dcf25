use super::{ChargePort, ChargeStation, ChargingError, StationId};
use crate::model::region::ZoneId;
use serde::{Deserialize, Serialize};
use uom::si::f64::Power;
use uom::si::power::kilowatt;

fn default_efficiency() -> f64 {
    1.0
}

/// configuration of one charging site.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChargeStationConfig {
    /// zone the station sits in
    pub location: u64,
    /// number of connectors
    pub ports: usize,
    /// per-port power ceiling, kW
    pub max_port_power: f64,
    /// optional site-wide power ceiling, kW
    pub max_total_power: Option<f64>,
    /// hardware efficiency in (0, 1], reported only
    #[serde(default = "default_efficiency")]
    pub efficiency: f64,
}

impl ChargeStationConfig {
    pub fn build(&self, station_id: StationId) -> Result<ChargeStation, ChargingError> {
        if self.ports == 0 {
            return Err(ChargingError::BuildError(format!(
                "station at zone {} has no ports",
                self.location
            )));
        }
        if self.max_port_power <= 0.0 {
            return Err(ChargingError::BuildError(format!(
                "station at zone {} has non-positive port power {}",
                self.location, self.max_port_power
            )));
        }
        if !(0.0..=1.0).contains(&self.efficiency) || self.efficiency == 0.0 {
            return Err(ChargingError::BuildError(format!(
                "station at zone {} has efficiency {} outside (0, 1]",
                self.location, self.efficiency
            )));
        }
        let p_max = Power::new::<kilowatt>(self.max_port_power);
        let ports = (0..self.ports)
            .map(|_| ChargePort::new(p_max, self.efficiency))
            .collect();
        Ok(ChargeStation::new(
            station_id,
            ZoneId(self.location),
            ports,
            self.max_total_power.map(Power::new::<kilowatt>),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_rejects_zero_ports() {
        let config = ChargeStationConfig {
            location: 5,
            ports: 0,
            max_port_power: 50.0,
            max_total_power: None,
            efficiency: 0.95,
        };
        assert!(matches!(
            config.build(StationId(0)),
            Err(ChargingError::BuildError(_))
        ));
    }

    #[test]
    fn test_build_from_toml_defaults_efficiency() {
        let config: ChargeStationConfig = serde_json::from_str(
            "{\"location\": 3, \"ports\": 2, \"max_port_power\": 62.5, \"max_total_power\": 100.0}",
        )
        .unwrap();
        assert_eq!(config.efficiency, 1.0);
        let station = config.build(StationId(1)).unwrap();
        assert_eq!(station.location(), ZoneId(3));
        assert_eq!(station.ports().len(), 2);
    }
}
