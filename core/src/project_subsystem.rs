//! Development and building projects.
//!
//! Both families are the same machine: a province commits workers from
//! one population class, the workers produce `workers × rate` units a
//! day against a cost scaled by the province's development at start,
//! and on completion the province gets the kind's fixed effects and its
//! workers back. The two families differ only in the constants of
//! their [`ProjectKind`].

use crate::{
    effect::Effect,
    error::{RejectReason, SimResult},
    event::SimEvent,
    registry::{RegistryEvent, TaskRegistry},
    rng::SubsystemRng,
    subsystem::SimSubsystem,
    task::{TaskState, TickReport, TimedTask, WorkProgress},
    types::{CountryName, ProvinceId, TaskId, Tick},
    world::{Modifier, PopClass, WorldMap},
};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub trait ProjectKind: Copy + Debug + PartialEq + Serialize + 'static {
    /// Family name used in logs, events and rejections.
    const FAMILY: &'static str;
    const ID_PREFIX: &'static str;
    const RATE_PER_WORKER: u64;
    /// Cost multiplier per point of development: `1 + development × this`.
    const DEVELOPMENT_SCALING: f64;
    /// Population class the workers are drawn from and returned to.
    const WORKER_CLASS: PopClass;

    fn base_work(&self) -> u64;
    fn label(&self) -> &'static str;
    /// Fixed effects applied on completion, before workers return.
    fn effects(&self) -> Vec<Effect>;

    fn total_work(&self, development: f64) -> u64 {
        let scaled = self.base_work() as f64 * (1.0 + development * Self::DEVELOPMENT_SCALING);
        scaled.max(0.0) as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DevelopmentKind {
    Infrastructure,
    Agriculture,
    Trade,
    Military,
}

impl ProjectKind for DevelopmentKind {
    const FAMILY: &'static str = "development";
    const ID_PREFIX: &'static str = "dev";
    const RATE_PER_WORKER: u64 = 10;
    const DEVELOPMENT_SCALING: f64 = 0.1;
    const WORKER_CLASS: PopClass = PopClass::Peasants;

    fn base_work(&self) -> u64 {
        match self {
            Self::Infrastructure => 1000,
            Self::Agriculture    => 800,
            Self::Trade          => 600,
            Self::Military       => 1200,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Infrastructure => "Infrastructure Development",
            Self::Agriculture    => "Agricultural Development",
            Self::Trade          => "Trade Development",
            Self::Military       => "Military Infrastructure",
        }
    }

    fn effects(&self) -> Vec<Effect> {
        let (delta, modifier) = match self {
            Self::Infrastructure => (2.0, "Improved Infrastructure"),
            Self::Agriculture    => (1.5, "Agricultural Development"),
            Self::Trade          => (1.0, "Trade Development"),
            Self::Military       => (1.0, "Military Infrastructure"),
        };
        vec![Effect::development(delta), Effect::modifier(Modifier::named(modifier))]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    Forum,
    Temple,
    Aqueduct,
    Walls,
    Barracks,
    Market,
    Bathhouse,
    Workshop,
}

impl ProjectKind for BuildingKind {
    const FAMILY: &'static str = "building";
    const ID_PREFIX: &'static str = "bld";
    // Craftsmen work faster than peasants.
    const RATE_PER_WORKER: u64 = 15;
    const DEVELOPMENT_SCALING: f64 = 0.05;
    const WORKER_CLASS: PopClass = PopClass::Craftsmen;

    fn base_work(&self) -> u64 {
        match self {
            Self::Forum     => 800,
            Self::Temple    => 600,
            Self::Aqueduct  => 1200,
            Self::Walls     => 1500,
            Self::Barracks  => 1000,
            Self::Market    => 700,
            Self::Bathhouse => 900,
            Self::Workshop  => 800,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Forum     => "Forum",
            Self::Temple    => "Temple",
            Self::Aqueduct  => "Aqueduct",
            Self::Walls     => "City Walls",
            Self::Barracks  => "Barracks",
            Self::Market    => "Market",
            Self::Bathhouse => "Bathhouse",
            Self::Workshop  => "Workshop",
        }
    }

    fn effects(&self) -> Vec<Effect> {
        let modifier = match self {
            Self::Forum     => Modifier::percent("Trade Income", 10),
            Self::Temple    => Modifier::percent("Population Happiness", 5),
            Self::Aqueduct  => Modifier::percent("Population Growth", 15),
            Self::Walls     => Modifier::percent("Defense", 20),
            Self::Barracks  => Modifier::percent("Recruitment Speed", 25),
            Self::Market    => Modifier::percent("Tax Income", 15),
            Self::Bathhouse => Modifier::percent("Population Happiness", 10),
            Self::Workshop  => Modifier::percent("Production", 20),
        };
        vec![
            Effect::AddBuilding { building: self.label().to_string() },
            Effect::modifier(modifier),
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Project<K: ProjectKind> {
    pub id:          TaskId,
    pub province_id: ProvinceId,
    pub kind:        K,
    pub work:        WorkProgress,
}

impl<K: ProjectKind> Project<K> {
    pub fn workers(&self) -> u64 {
        self.work.workers
    }

    pub fn total_work(&self) -> u64 {
        self.work.total_required
    }
}

impl<K: ProjectKind> TimedTask for Project<K> {
    fn id(&self) -> &TaskId {
        &self.id
    }

    fn target_province(&self) -> &ProvinceId {
        &self.province_id
    }

    fn owner_country(&self) -> Option<&CountryName> {
        None
    }

    fn state(&self) -> TaskState {
        self.work.state()
    }

    fn progress_fraction(&self) -> f64 {
        self.work.fraction()
    }

    fn advance(&mut self, _rng: &mut SubsystemRng) -> TickReport {
        self.work.advance();
        TickReport::default()
    }

    fn completion_effects(&self) -> Vec<Effect> {
        let mut effects = self.kind.effects();
        effects.extend(self.cancellation_effects());
        effects
    }

    fn cancellation_effects(&self) -> Vec<Effect> {
        vec![Effect::population(K::WORKER_CLASS, self.work.workers as i64)]
    }

    fn describe(&self) -> String {
        format!("{} in {}", self.kind.label(), self.province_id)
    }
}

pub struct ProjectSubsystem<K: ProjectKind> {
    registry: TaskRegistry<Project<K>>,
}

pub type DevelopmentSubsystem = ProjectSubsystem<DevelopmentKind>;
pub type BuildingSubsystem = ProjectSubsystem<BuildingKind>;

impl<K: ProjectKind> Default for ProjectSubsystem<K> {
    fn default() -> Self { Self::new() }
}

impl<K: ProjectKind> ProjectSubsystem<K> {
    pub fn new() -> Self {
        Self { registry: TaskRegistry::new(K::FAMILY, K::ID_PREFIX) }
    }

    /// Commit `workers` from the province's worker class to a new project.
    /// The workers are withheld until the project completes or is cancelled.
    pub fn start_project(
        &mut self,
        world: &mut dyn WorldMap,
        province_id: &str,
        kind: K,
        workers: u64,
    ) -> SimResult<TaskId> {
        if workers == 0 {
            return Err(RejectReason::NoWorkers.into());
        }
        if self.registry.has_task_for(province_id) {
            return Err(RejectReason::TaskAlreadyActive {
                province_id: province_id.to_string(),
                family: K::FAMILY,
            }
            .into());
        }
        let province = world
            .province_mut(province_id)
            .ok_or_else(|| RejectReason::UnknownProvince(province_id.to_string()))?;

        let available = province.pop(K::WORKER_CLASS);
        if available < workers {
            return Err(RejectReason::InsufficientPopulation {
                province_id: province_id.to_string(),
                class: K::WORKER_CLASS.as_str().to_string(),
                available,
                requested: workers,
            }
            .into());
        }
        province.set_pop(K::WORKER_CLASS, available - workers);
        let total = kind.total_work(province.development);

        let id = self.registry.next_id();
        log::info!(
            "{} project {id} started: {} in {province_id}, {workers} workers, {total} work",
            K::FAMILY,
            kind.label()
        );
        self.registry.insert(Project {
            id: id.clone(),
            province_id: province_id.to_string(),
            kind,
            work: WorkProgress::new(workers, K::RATE_PER_WORKER, total),
        });
        Ok(id)
    }

    pub fn cancel(&mut self, project_id: &str, world: &mut dyn WorldMap) -> Option<Project<K>> {
        self.registry.cancel(project_id, world)
    }

    pub fn active_projects(&self) -> &[Project<K>] {
        self.registry.tasks()
    }

    pub fn project(&self, project_id: &str) -> Option<&Project<K>> {
        self.registry.get(project_id)
    }

    pub fn projects_in(&self, province_id: &str) -> Vec<&Project<K>> {
        self.registry
            .tasks()
            .iter()
            .filter(|p| p.province_id == province_id)
            .collect()
    }
}

impl<K: ProjectKind> SimSubsystem for ProjectSubsystem<K> {
    fn name(&self) -> &'static str { K::FAMILY }

    fn update(
        &mut self,
        tick: Tick,
        world: &mut dyn WorldMap,
        rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        let mut out = Vec::new();
        for event in self.registry.advance(world, rng) {
            match event {
                RegistryEvent::Completed { task_id, province_id, label, .. } => {
                    out.push(SimEvent::ProjectCompleted {
                        tick,
                        project_id: task_id,
                        family: K::FAMILY.into(),
                        province_id,
                        description: label,
                    });
                }
                RegistryEvent::EffectsSkipped { task_id, province_id, reason } => {
                    out.push(SimEvent::TaskEffectsSkipped {
                        tick,
                        task_id,
                        family: K::FAMILY.into(),
                        province_id,
                        reason,
                    });
                }
                RegistryEvent::EventDrawn { .. } => {}
            }
        }
        if !out.is_empty() {
            log::debug!("tick={tick} {}: active={} resolved={}", K::FAMILY, self.registry.len(), out.len());
        }
        Ok(out)
    }
}
