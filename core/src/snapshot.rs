//! Snapshot serialization: full simulation state to JSON.
//!
//! A snapshot is taken every SNAPSHOT_INTERVAL ticks. It captures the
//! world map and every live task so a host can inspect or archive the
//! run at that point.

use crate::{
    clock::SimClock,
    colonization_subsystem::ColonizationMission,
    project_subsystem::{BuildingKind, DevelopmentKind, Project},
    technology_subsystem::ResearchProgress,
    types::{RunId, Tick},
    world::World,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

pub const SNAPSHOT_INTERVAL: Tick = 30; // monthly

#[derive(Debug, Serialize)]
pub struct SimSnapshot<'a> {
    pub run_id:       &'a RunId,
    pub tick:         Tick,
    pub date:         NaiveDate,
    pub clock:        &'a SimClock,
    pub world:        &'a World,
    pub colonization: &'a [ColonizationMission],
    pub development:  &'a [Project<DevelopmentKind>],
    pub building:     &'a [Project<BuildingKind>],
    pub research:     &'a [ResearchProgress],
    pub known_technologies: BTreeMap<&'a str, Vec<String>>,
}
