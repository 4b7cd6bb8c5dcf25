use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// file source for a [`super::ZoneGraph`]: a CSV with
/// `origin,destination,distance_km,time_s` columns where each row is one
/// observed trip sample.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ZoneGraphConfig {
    pub input_file: PathBuf,
}
