mod region_error;
mod region_model;
mod zone_graph;
mod zone_graph_config;
mod zone_id;

pub use region_error::RegionError;
pub use region_model::RegionModel;
pub use zone_graph::{OdSample, ZoneGraph};
pub use zone_graph_config::ZoneGraphConfig;
pub use zone_id::ZoneId;
