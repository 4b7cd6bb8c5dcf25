mod clock;
mod observation;
mod sim_error;
mod simulation_config;
mod simulator;
mod step_info;
mod violation;

pub use clock::SimClock;
pub use observation::{observe, OBSERVATION_WIDTH};
pub use sim_error::SimulatorError;
pub use simulation_config::{FleetConfig, RewardConfig, SimulationConfig};
pub use simulator::{Simulator, StepOutcome};
pub use step_info::StepInfo;
pub use violation::Violation;
