use clap::Parser;
use fleetsim::app::cli::cli_args::CliArgs;
use fleetsim::app::cli::run;
use log::error;

fn main() {
    env_logger::init();

    let args = CliArgs::parse();
    match run::command_line_runner(&args) {
        Ok(_) => {}
        Err(e) => {
            error!("{}", e)
        }
    }
}
