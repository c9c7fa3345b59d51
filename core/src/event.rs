//! The event log vocabulary.
//!
//! RULE: Every world mutation and every accepted or cancelled command
//! leaves a SimEvent behind. Events are descriptive only; nothing in
//! the core reacts to them.

use crate::{
    catalog::EventCategory,
    types::{CountryName, ProvinceId, RunId, TaskId, Tick},
};
use serde::{Deserialize, Serialize};

/// Variants are appended over time, never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Engine events ──────────────────────────────
    TickStarted {
        tick: Tick,
    },
    TickCompleted {
        tick: Tick,
    },
    RunInitialized {
        run_id: RunId,
        seed: u64,
    },

    // ── Colonization ───────────────────────────────
    ColonizationStarted {
        tick: Tick,
        mission_id: TaskId,
        country: CountryName,
        province_id: ProvinceId,
        colonists: u32,
        max_duration_days: u32,
    },
    ColonizationEventOccurred {
        tick: Tick,
        mission_id: TaskId,
        province_id: ProvinceId,
        category: EventCategory,
        name: String,
    },
    ColonizationCompleted {
        tick: Tick,
        mission_id: TaskId,
        province_id: ProvinceId,
        effects_applied: usize,
    },

    // ── Development and building projects ──────────
    ProjectStarted {
        tick: Tick,
        project_id: TaskId,
        family: String,
        province_id: ProvinceId,
        kind: String,
        workers: u64,
        total_work: u64,
    },
    ProjectCompleted {
        tick: Tick,
        project_id: TaskId,
        family: String,
        province_id: ProvinceId,
        description: String,
    },

    // ── Shared task lifecycle ──────────────────────
    TaskCancelled {
        tick: Tick,
        task_id: TaskId,
        family: String,
        province_id: ProvinceId,
    },
    TaskEffectsSkipped {
        tick: Tick,
        task_id: TaskId,
        family: String,
        province_id: ProvinceId,
        reason: String,
    },

    // ── Technology ─────────────────────────────────
    ResearchStarted {
        tick: Tick,
        country: CountryName,
        technology: String,
    },
    ResearchStopped {
        tick: Tick,
        country: CountryName,
        technology: String,
    },
    ResearchCompleted {
        tick: Tick,
        country: CountryName,
        technology: String,
    },
    TechnologyGranted {
        tick: Tick,
        country: CountryName,
        technology: String,
    },
}

impl SimEvent {
    /// Stable string name, used for the event_type column in event_log.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::TickStarted { .. }               => "tick_started",
            Self::TickCompleted { .. }             => "tick_completed",
            Self::RunInitialized { .. }            => "run_initialized",
            Self::ColonizationStarted { .. }       => "colonization_started",
            Self::ColonizationEventOccurred { .. } => "colonization_event_occurred",
            Self::ColonizationCompleted { .. }     => "colonization_completed",
            Self::ProjectStarted { .. }            => "project_started",
            Self::ProjectCompleted { .. }          => "project_completed",
            Self::TaskCancelled { .. }             => "task_cancelled",
            Self::TaskEffectsSkipped { .. }        => "task_effects_skipped",
            Self::ResearchStarted { .. }           => "research_started",
            Self::ResearchStopped { .. }           => "research_stopped",
            Self::ResearchCompleted { .. }         => "research_completed",
            Self::TechnologyGranted { .. }         => "technology_granted",
        }
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id: Option<i64>,
    pub run_id: RunId,
    pub tick: Tick,
    pub subsystem: String,
    pub event_type: String,
    pub payload: String, // JSON-serialized SimEvent
}
