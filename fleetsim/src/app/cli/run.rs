use super::cli_args::CliArgs;
use crate::app::fleet_app::FleetApp;
use crate::app::fleet_app_config;
use crate::app::fleet_app_error::FleetAppError;
use crate::app::policy;
use crate::app::run_log::RunLog;
use log::info;
use std::path::Path;

/// runs one simulation episode from the command line: load configuration,
/// apply CLI overrides, build the policy and optional run log, run to
/// termination or truncation.
pub fn command_line_runner(args: &CliArgs) -> Result<(), FleetAppError> {
    let config_path = Path::new(&args.config_file);
    let mut config = fleet_app_config::from_path(config_path)?;
    if let Some(max_steps) = args.max_steps {
        config.max_steps = max_steps;
    }
    if let Some(delta_t) = args.delta_t {
        config.delta_t = delta_t;
    }

    let policy = policy::from_name(&args.policy)?;
    let run_log = match &args.output {
        Some(output) => Some(RunLog::create(output, config.fleet.size)?),
        None => None,
    };

    let mut app = FleetApp::new(config, policy, run_log)?;
    let summary = app.run(args.seed)?;
    info!(
        "episode finished after {} steps ({}): {} completed, {} rejected, {} failed, final reward {:.3}",
        summary.steps,
        if summary.terminated { "terminated" } else { "truncated" },
        summary.completed,
        summary.rejected,
        summary.failed,
        summary.final_reward
    );
    Ok(())
}
