//! Shared primitive types used across the entire simulation.

/// A simulation tick. One tick = one in-game day.
pub type Tick = u64;

/// A stable, unique identifier for any entity in the simulation.
pub type EntityId = String;

/// The canonical run identifier.
pub type RunId = String;

/// Province identifier as used by the world map.
pub type ProvinceId = String;

/// Countries are addressed by name.
pub type CountryName = String;

/// Identifier of a live timed task (mission, project). Stable for the
/// task's lifetime and never reused within a registry.
pub type TaskId = EntityId;
