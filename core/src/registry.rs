//! Generic owner of one family of live timed tasks.
//!
//! Each tick the registry advances every task in insertion order,
//! splits off the ones that completed, applies their completion effects
//! through the resolver and drops them, all inside the same call.

use crate::{
    catalog::EventCategory,
    effect::{apply_all, Effect},
    rng::SubsystemRng,
    task::TimedTask,
    types::{ProvinceId, TaskId},
    world::WorldMap,
};

/// Something the registry did this tick, for the owning subsystem to
/// turn into log events.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryEvent {
    EventDrawn {
        task_id:     TaskId,
        province_id: ProvinceId,
        category:    EventCategory,
        name:        String,
    },
    Completed {
        task_id:         TaskId,
        province_id:     ProvinceId,
        label:           String,
        effects_applied: usize,
        effects_skipped: usize,
    },
    /// Completed, but the province or country it needed is gone.
    /// Dropped with no mutation.
    EffectsSkipped {
        task_id:     TaskId,
        province_id: ProvinceId,
        reason:      String,
    },
}

pub struct TaskRegistry<T> {
    family:    &'static str,
    id_prefix: &'static str,
    next_seq:  u64,
    tasks:     Vec<T>,
}

impl<T: TimedTask> TaskRegistry<T> {
    pub fn new(family: &'static str, id_prefix: &'static str) -> Self {
        Self { family, id_prefix, next_seq: 0, tasks: Vec::new() }
    }

    pub fn family(&self) -> &'static str {
        self.family
    }

    /// Allocate the next task id. Ids are never reused.
    pub fn next_id(&mut self) -> TaskId {
        self.next_seq += 1;
        format!("{}-{:06}", self.id_prefix, self.next_seq)
    }

    pub fn insert(&mut self, task: T) {
        self.tasks.push(task);
    }

    pub fn tasks(&self) -> &[T] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, task_id: &str) -> Option<&T> {
        self.tasks.iter().find(|t| t.id() == task_id)
    }

    pub fn has_task_for(&self, province_id: &str) -> bool {
        self.tasks.iter().any(|t| t.target_province() == province_id)
    }

    /// Advance every task one tick and resolve the ones that finished.
    pub fn advance(&mut self, world: &mut dyn WorldMap, rng: &mut SubsystemRng) -> Vec<RegistryEvent> {
        let mut out = Vec::new();

        for task in &mut self.tasks {
            let report = task.advance(rng);
            for (category, name) in report.drawn_events {
                out.push(RegistryEvent::EventDrawn {
                    task_id: task.id().clone(),
                    province_id: task.target_province().clone(),
                    category,
                    name,
                });
            }
        }

        // Split off finished tasks before touching the world so removal
        // never disturbs the iteration above.
        let (finished, live): (Vec<T>, Vec<T>) =
            std::mem::take(&mut self.tasks).into_iter().partition(|t| t.is_completed());
        self.tasks = live;

        for task in finished {
            out.push(self.resolve_completion(&task, world));
        }
        out
    }

    fn resolve_completion(&self, task: &T, world: &mut dyn WorldMap) -> RegistryEvent {
        let task_id = task.id().clone();
        let province_id = task.target_province().clone();

        if let Some(reason) = missing_reference(task, &*world) {
            log::warn!(
                "{} task {task_id} finished but {reason}; dropping without effects",
                self.family
            );
            return RegistryEvent::EffectsSkipped { task_id, province_id, reason };
        }

        let effects = task.completion_effects();
        let skipped = apply_all(world, &province_id, &effects);
        if skipped > 0 {
            log::warn!("{} task {task_id}: {skipped} effect(s) could not be applied", self.family);
        }
        log::info!("{} task {task_id} completed: {}", self.family, task.describe());

        RegistryEvent::Completed {
            task_id,
            province_id,
            label: task.describe(),
            effects_applied: effects.len() - skipped,
            effects_skipped: skipped,
        }
    }

    /// Remove a task without completing it, applying only its
    /// cancellation effects. Returns `None` when the id is unknown, so
    /// repeated calls are harmless.
    pub fn cancel(&mut self, task_id: &str, world: &mut dyn WorldMap) -> Option<T> {
        let index = self.tasks.iter().position(|t| t.id() == task_id)?;
        let task = self.tasks.remove(index);
        let refunds: Vec<Effect> = task.cancellation_effects();
        let skipped = apply_all(world, task.target_province(), &refunds);
        if skipped > 0 {
            log::warn!(
                "{} task {task_id} cancelled but province '{}' is gone; nothing returned",
                self.family,
                task.target_province()
            );
        }
        log::info!("{} task {task_id} cancelled", self.family);
        Some(task)
    }
}

fn missing_reference<T: TimedTask>(task: &T, world: &dyn WorldMap) -> Option<String> {
    if world.province(task.target_province()).is_none() {
        return Some(format!("province '{}' no longer exists", task.target_province()));
    }
    match task.owner_country() {
        Some(country) if world.country(country).is_none() => {
            Some(format!("country '{country}' no longer exists"))
        }
        _ => None,
    }
}
