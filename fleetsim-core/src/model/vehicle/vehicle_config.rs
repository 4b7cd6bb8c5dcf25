use super::VehicleError;
use serde::{Deserialize, Serialize};
use uom::si::energy::kilowatt_hour;
use uom::si::f64::Energy;

/// vehicle model parameters: a named catalog entry or explicit values.
///
/// In configuration files this is either a string (`"byd e6"`) or a table
/// with `capacity_kwh` and `efficiency_kwh_per_100km` keys.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VehicleModelConfig {
    Named(String),
    Custom {
        capacity_kwh: f64,
        efficiency_kwh_per_100km: f64,
    },
}

impl VehicleModelConfig {
    /// resolves to `(battery capacity, efficiency in kWh/100km)`.
    pub fn resolve(&self) -> Result<(Energy, f64), VehicleError> {
        match self {
            VehicleModelConfig::Named(name) => match name.to_lowercase().as_str() {
                "byd e6" => Ok((Energy::new::<kilowatt_hour>(71.7), 17.1)),
                _ => Err(VehicleError::UnknownModel(name.clone())),
            },
            VehicleModelConfig::Custom {
                capacity_kwh,
                efficiency_kwh_per_100km,
            } => {
                if *capacity_kwh <= 0.0 || *efficiency_kwh_per_100km <= 0.0 {
                    return Err(VehicleError::BuildError(format!(
                        "vehicle model requires positive capacity and efficiency, got {} kWh / {} kWh/100km",
                        capacity_kwh, efficiency_kwh_per_100km
                    )));
                }
                Ok((
                    Energy::new::<kilowatt_hour>(*capacity_kwh),
                    *efficiency_kwh_per_100km,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_model_resolves() {
        let config = VehicleModelConfig::Named(String::from("BYD e6"));
        let (capacity, efficiency) = config.resolve().unwrap();
        assert_eq!(capacity.get::<kilowatt_hour>(), 71.7);
        assert_eq!(efficiency, 17.1);
    }

    #[test]
    fn test_unknown_model_is_an_error() {
        let config = VehicleModelConfig::Named(String::from("warp drive"));
        assert!(matches!(
            config.resolve(),
            Err(VehicleError::UnknownModel(_))
        ));
    }

    #[test]
    fn test_untagged_deserialization() {
        let named: VehicleModelConfig = serde_json::from_str("\"byd e6\"").unwrap();
        assert!(matches!(named, VehicleModelConfig::Named(_)));
        let custom: VehicleModelConfig =
            serde_json::from_str("{\"capacity_kwh\": 60.0, \"efficiency_kwh_per_100km\": 15.0}")
                .unwrap();
        let (capacity, _) = custom.resolve().unwrap();
        assert_eq!(capacity.get::<kilowatt_hour>(), 60.0);
    }
}
