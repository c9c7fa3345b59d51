use serde::{Deserialize, Serialize};
use crate::{
    project_subsystem::{BuildingKind, DevelopmentKind},
    types::{CountryName, ProvinceId, TaskId},
};

/// All player-issued commands a host can route into the engine.
/// Variants are appended over time, never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerCommand {
    // ── Colonization ──────────────────────────────
    Colonize {
        country:     CountryName,
        province_id: ProvinceId,
        colonists:   u32,
    },

    // ── Projects ──────────────────────────────────
    Develop {
        province_id: ProvinceId,
        kind:        DevelopmentKind,
        workers:     u64,
    },
    Build {
        province_id: ProvinceId,
        kind:        BuildingKind,
        workers:     u64,
    },

    // ── Technology ────────────────────────────────
    Research {
        country:    CountryName,
        technology: String,
    },
    StopResearch {
        country:    CountryName,
        technology: String,
    },
    Grant {
        country:    CountryName,
        technology: String,
    },

    // ── Any task family ───────────────────────────
    Cancel {
        task_id: TaskId,
    },
}

/// What an accepted command produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    TaskStarted { task_id: TaskId },
    Applied,
    /// Valid request with nothing to act on (unknown task id, research
    /// that was not running).
    NoOp,
}
