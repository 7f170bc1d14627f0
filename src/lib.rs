//! Spirit Swarm - tick-based tactical engine for a two-player spirit swarm

pub mod abilities;
pub mod assessment;
pub mod core;
pub mod energize;
pub mod geometry;
pub mod memory;
pub mod movement;
pub mod orders;
pub mod roles;
pub mod scenario;
pub mod tick;
pub mod world;

pub use tick::{run_tick, Agent, TickOutcome};
