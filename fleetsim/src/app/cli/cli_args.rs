use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// simulation configuration TOML file
    #[arg(short, long, value_name = "*.toml")]
    pub config_file: String,

    /// path for the per-tick CSV run log
    #[arg(short, long, value_name = "*.csv")]
    pub output: Option<String>,

    /// scheduling policy driving the fleet
    #[arg(short, long, default_value = "eightytwenty")]
    pub policy: String,

    /// seed for the fleet placement RNG
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// override the configured step limit
    #[arg(short = 'n', long)]
    pub max_steps: Option<u64>,

    /// override the configured tick length in seconds
    #[arg(short = 'd', long)]
    pub delta_t: Option<u64>,
}
