use super::fleet_app_error::FleetAppError;
use config::Config;
use fleetsim_core::sim::SimulationConfig;
use std::path::Path;

/// loads a [`SimulationConfig`] by merging a user TOML file over the
/// compiled-in defaults. the user file must provide at least the
/// simulation window and the region and demand file paths; everything
/// else has a default.
pub fn from_path(config_path: &Path) -> Result<SimulationConfig, FleetAppError> {
    let user_toml = std::fs::read_to_string(config_path).map_err(|e| {
        FleetAppError::BuildFailure(format!(
            "could not read configuration file {:?}: {}",
            config_path, e
        ))
    })?;
    from_str(&user_toml, config::FileFormat::Toml)
}

/// merges a stringified configuration over the defaults and deserializes
/// the result.
pub fn from_str(
    user_config: &str,
    format: config::FileFormat,
) -> Result<SimulationConfig, FleetAppError> {
    let default_config = config::File::from_str(
        include_str!("config.default.toml"),
        config::FileFormat::Toml,
    );
    let user_config = config::File::from_str(user_config, format);

    let merged = Config::builder()
        .add_source(default_config)
        .add_source(user_config)
        .build()?;
    let config_json = merged.try_deserialize::<serde_json::Value>()?;
    let simulation_config: SimulationConfig = serde_json::from_value(config_json)?;
    Ok(simulation_config)
}
