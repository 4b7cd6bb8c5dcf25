//! Core engine of the fleetsim electric-taxi fleet simulator.
//!
//! The crate is organized around a set of small state machines
//! ([`model`]) and the tick-driven [`sim::Simulator`] that advances them
//! through simulated time. Scheduling policies live outside this crate and
//! interact with the engine only through the observation/action interface
//! of [`sim::Simulator::step`].

pub mod model;
pub mod sim;
