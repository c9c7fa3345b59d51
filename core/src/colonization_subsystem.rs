//! Colonization subsystem.
//!
//! A mission sends colonists to an uninhabited province. It runs for a
//! fixed number of days set by the colonist count, collects random
//! events along the way, and on completion hands the province to the
//! sending country with every collected event applied in draw order.

use crate::{
    catalog::{ColonizationEvent, EventGenerator},
    config::{ColonizationConfig, SimConfig},
    effect::Effect,
    error::{RejectReason, SimResult},
    event::SimEvent,
    registry::{RegistryEvent, TaskRegistry},
    rng::SubsystemRng,
    subsystem::SimSubsystem,
    task::{DurationProgress, TaskState, TickReport, TimedTask},
    types::{CountryName, ProvinceId, TaskId, Tick},
    world::{PopClass, WorldMap},
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct ColonizationMission {
    pub id:          TaskId,
    pub country:     CountryName,
    pub province_id: ProvinceId,
    pub colonists:   u32,
    pub duration:    DurationProgress,
    pub events:      Vec<ColonizationEvent>,
    in_flight_event_chance: f64,
    #[serde(skip)]
    generator: Arc<EventGenerator>,
}

impl ColonizationMission {
    pub fn max_duration_days(&self) -> u32 {
        self.duration.max_days
    }

    pub fn elapsed_days(&self) -> u32 {
        self.duration.elapsed_days
    }
}

impl TimedTask for ColonizationMission {
    fn id(&self) -> &TaskId {
        &self.id
    }

    fn target_province(&self) -> &ProvinceId {
        &self.province_id
    }

    fn owner_country(&self) -> Option<&CountryName> {
        Some(&self.country)
    }

    fn state(&self) -> TaskState {
        self.duration.state()
    }

    fn progress_fraction(&self) -> f64 {
        self.duration.fraction()
    }

    fn advance(&mut self, rng: &mut SubsystemRng) -> TickReport {
        let mut report = TickReport::default();
        if self.duration.completed {
            return report;
        }

        self.events.iter_mut().for_each(ColonizationEvent::age);
        self.duration.advance();

        if rng.chance(self.in_flight_event_chance) {
            if let Some(event) = self.generator.draw_in_flight(rng) {
                report.drawn_events.push((event.category, event.name.clone()));
                self.events.push(event);
            }
        }
        report
    }

    fn completion_effects(&self) -> Vec<Effect> {
        let mut effects = vec![Effect::TransferOwnership { country: self.country.clone() }];
        effects.extend(self.events.iter().flat_map(|e| e.effects.iter().cloned()));
        effects.push(Effect::development(1.0));
        effects.push(Effect::population(PopClass::Peasants, i64::from(self.colonists)));
        effects
    }

    fn cancellation_effects(&self) -> Vec<Effect> {
        // Colonists never came out of the target province.
        Vec::new()
    }

    fn describe(&self) -> String {
        format!(
            "colonization of {} by {} ({} colonists)",
            self.province_id, self.country, self.colonists
        )
    }
}

pub struct ColonizationSubsystem {
    config:    ColonizationConfig,
    generator: Arc<EventGenerator>,
    registry:  TaskRegistry<ColonizationMission>,
}

impl ColonizationSubsystem {
    pub fn new(config: &SimConfig) -> Self {
        let c = &config.colonization;
        Self {
            generator: Arc::new(EventGenerator::new(
                config.event_catalog.clone(),
                c.initial_partition,
                c.in_flight_partition,
            )),
            config: c.clone(),
            registry: TaskRegistry::new("colonization", "col"),
        }
    }

    /// Open a mission from `country` to `province_id`. Nothing changes
    /// on rejection.
    pub fn start_colonization(
        &mut self,
        world: &dyn WorldMap,
        country: &str,
        province_id: &str,
        colonists: u32,
        rng: &mut SubsystemRng,
    ) -> SimResult<TaskId> {
        let province = world
            .province(province_id)
            .ok_or_else(|| RejectReason::UnknownProvince(province_id.to_string()))?;
        if world.country(country).is_none() {
            return Err(RejectReason::UnknownCountry(country.to_string()).into());
        }
        if !province.is_unowned() {
            return Err(RejectReason::ProvinceOwned {
                province_id: province_id.to_string(),
                owner: province.owner.clone(),
            }
            .into());
        }
        if !(self.config.min_colonists..=self.config.max_colonists).contains(&colonists) {
            return Err(RejectReason::ColonistCountOutOfRange {
                count: colonists,
                min: self.config.min_colonists,
                max: self.config.max_colonists,
            }
            .into());
        }
        if self.registry.has_task_for(province_id) {
            return Err(RejectReason::TaskAlreadyActive {
                province_id: province_id.to_string(),
                family: "colonization",
            }
            .into());
        }

        let count = rng.range_inclusive(self.config.initial_events_min, self.config.initial_events_max);
        let events = self.generator.draw_initial(count, rng);

        let id = self.registry.next_id();
        let mission = ColonizationMission {
            id: id.clone(),
            country: country.to_string(),
            province_id: province_id.to_string(),
            colonists,
            duration: DurationProgress::new(self.config.max_duration_days(colonists)),
            events,
            in_flight_event_chance: self.config.in_flight_event_chance,
            generator: Arc::clone(&self.generator),
        };
        log::info!(
            "Colonization started: {country} -> {province_id}, {colonists} colonists, {} days, {} events",
            mission.max_duration_days(),
            mission.events.len()
        );
        self.registry.insert(mission);
        Ok(id)
    }

    pub fn cancel(&mut self, mission_id: &str, world: &mut dyn WorldMap) -> Option<ColonizationMission> {
        self.registry.cancel(mission_id, world)
    }

    pub fn active_missions(&self) -> &[ColonizationMission] {
        self.registry.tasks()
    }

    pub fn mission(&self, mission_id: &str) -> Option<&ColonizationMission> {
        self.registry.get(mission_id)
    }

    /// Uninhabited provinces with no mission already heading there.
    pub fn colonizable_provinces(&self, world: &dyn WorldMap) -> Vec<ProvinceId> {
        world
            .province_ids()
            .into_iter()
            .filter(|id| world.province(id).is_some_and(|p| p.is_unowned()))
            .filter(|id| !self.registry.has_task_for(id))
            .collect()
    }
}

impl SimSubsystem for ColonizationSubsystem {
    fn name(&self) -> &'static str { "colonization" }

    fn update(
        &mut self,
        tick: Tick,
        world: &mut dyn WorldMap,
        rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        let events = self
            .registry
            .advance(world, rng)
            .into_iter()
            .map(|e| match e {
                RegistryEvent::EventDrawn { task_id, province_id, category, name } => {
                    SimEvent::ColonizationEventOccurred {
                        tick,
                        mission_id: task_id,
                        province_id,
                        category,
                        name,
                    }
                }
                RegistryEvent::Completed { task_id, province_id, effects_applied, .. } => {
                    SimEvent::ColonizationCompleted {
                        tick,
                        mission_id: task_id,
                        province_id,
                        effects_applied,
                    }
                }
                RegistryEvent::EffectsSkipped { task_id, province_id, reason } => {
                    SimEvent::TaskEffectsSkipped {
                        tick,
                        task_id,
                        family: "colonization".into(),
                        province_id,
                        reason,
                    }
                }
            })
            .collect::<Vec<_>>();

        log::debug!(
            "tick={tick} colonization: active={} emitted={}",
            self.registry.len(),
            events.len()
        );
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Country, Province, World};

    #[test]
    fn completed_mission_draws_no_more_events() {
        let mut config = SimConfig::default_test();
        config.colonization.in_flight_event_chance = 1.0;
        let mut subsystem = ColonizationSubsystem::new(&config);
        let mut world = World::new();
        world.insert_country(Country::new("Rome"));
        world.insert_province(Province::new("sardinia"));
        let mut rng = SubsystemRng::new(3, 0);

        let id = subsystem
            .start_colonization(&world, "Rome", "sardinia", 100, &mut rng)
            .unwrap();
        let mut mission = subsystem.mission(&id).cloned().unwrap();
        let initial = mission.events.len();

        for _ in 0..mission.max_duration_days() {
            assert_eq!(mission.advance(&mut rng).drawn_events.len(), 1);
        }
        assert!(mission.is_completed());
        assert_eq!(mission.events.len(), initial + 31);

        let report = mission.advance(&mut rng);
        assert!(report.drawn_events.is_empty());
        assert_eq!(mission.events.len(), initial + 31);
        assert_eq!(mission.elapsed_days(), 31);
    }
}
