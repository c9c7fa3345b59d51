//! Subsystem trait.
//!
//! RULE: Every task registry implements SimSubsystem.
//! The engine calls update() on each registered subsystem
//! in a fixed order, once per tick.
//! Execution order is fixed and documented in engine.rs.

use crate::{
    error::SimResult,
    event::SimEvent,
    rng::SubsystemRng,
    types::Tick,
    world::WorldMap,
};

/// The contract every subsystem must fulfill.
pub trait SimSubsystem {
    /// Unique stable name for this subsystem.
    fn name(&self) -> &'static str;

    /// Called once per tick by the engine.
    ///
    /// - `tick`:  the current tick number
    /// - `world`: the province/country map this subsystem mutates
    /// - `rng`:   this subsystem's deterministic RNG for this tick
    ///
    /// Returns a vec of new events to add to the tick's event log.
    fn update(
        &mut self,
        tick: Tick,
        world: &mut dyn WorldMap,
        rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>>;
}
