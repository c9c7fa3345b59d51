//! roma-core: the timed-task simulation core.
//!
//! Colonization missions, development and building projects, and
//! technology research all advance one in-game day per engine tick.

pub mod catalog;
pub mod clock;
pub mod colonization_subsystem;
pub mod command;
pub mod config;
pub mod effect;
pub mod engine;
pub mod error;
pub mod event;
pub mod project_subsystem;
pub mod registry;
pub mod rng;
pub mod snapshot;
pub mod store;
pub mod subsystem;
pub mod task;
pub mod technology_subsystem;
pub mod types;
pub mod world;
