use fleetsim_core::sim::SimulatorError;

#[derive(thiserror::Error, Debug)]
pub enum FleetAppError {
    #[error("failure building the application: {0}")]
    BuildFailure(String),
    #[error("failure reading configuration: {source}")]
    ConfigFailure {
        #[from]
        source: config::ConfigError,
    },
    #[error("failure interpreting configuration: {source}")]
    ConfigFormatFailure {
        #[from]
        source: serde_json::Error,
    },
    #[error("simulation failure: {source}")]
    SimulationFailure {
        #[from]
        source: SimulatorError,
    },
    #[error("failure writing the run log: {source}")]
    RunLogFailure {
        #[from]
        source: csv::Error,
    },
    #[error("io failure: {source}")]
    IoFailure {
        #[from]
        source: std::io::Error,
    },
}
