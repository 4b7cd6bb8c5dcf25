use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// file source for a demand stream: a time-sorted trip log CSV.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DemandConfig {
    pub input_file: PathBuf,
}
