//! Command-line application around `fleetsim-core`: configuration loading,
//! baseline scheduling policies, the episode runner and the per-tick run
//! log.

pub mod app;
