//! The simulation engine. One call per in-game day advances every
//! task registry.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Colonization subsystem
//!   2. Development subsystem
//!   3. Building subsystem
//!   4. Technology subsystem
//!
//! RULES:
//!   - Subsystems execute in the order above, every tick.
//!   - Within a subsystem, tasks advance in insertion order.
//!   - All randomness flows through the RngBank.
//!   - Every event, including accepted commands, is recorded in the event log.

use crate::{
    clock::SimClock,
    command::{CommandOutcome, PlayerCommand},
    colonization_subsystem::{ColonizationMission, ColonizationSubsystem},
    config::SimConfig,
    error::{SimError, SimResult},
    event::{EventLogEntry, SimEvent},
    project_subsystem::{
        BuildingKind, BuildingSubsystem, DevelopmentKind, DevelopmentSubsystem, ProjectKind,
    },
    rng::{RngBank, SubsystemSlot},
    snapshot::{SimSnapshot, SNAPSHOT_INTERVAL},
    store::SimStore,
    subsystem::SimSubsystem,
    technology_subsystem::TechnologySubsystem,
    types::{ProvinceId, RunId, TaskId, Tick},
    world::World,
};

pub struct SimEngine {
    pub run_id:       RunId,
    pub clock:        SimClock,
    pub rng_bank:     RngBank,
    seed:             u64,
    command_seq:      u64,
    pub world:        World,
    pub colonization: ColonizationSubsystem,
    pub development:  DevelopmentSubsystem,
    pub building:     BuildingSubsystem,
    pub technology:   TechnologySubsystem,
    pub store:        SimStore,
}

impl SimEngine {
    pub fn new(run_id: RunId, seed: u64, store: SimStore, config: &SimConfig, world: World) -> Self {
        Self {
            clock:        SimClock::new(run_id.clone()),
            rng_bank:     RngBank::new(seed),
            seed,
            command_seq:  0,
            world,
            colonization: ColonizationSubsystem::new(config),
            development:  DevelopmentSubsystem::new(),
            building:     BuildingSubsystem::new(),
            technology:   TechnologySubsystem::new(config),
            store,
            run_id,
        }
    }

    /// Build a fully wired engine from the game data in `data_dir`.
    /// The store must already be migrated and hold the run record.
    pub fn build(run_id: RunId, seed: u64, store: SimStore, data_dir: &str, world: World) -> SimResult<Self> {
        let config = SimConfig::load(data_dir)?;
        Ok(Self::new(run_id, seed, store, &config, world))
    }

    /// In-memory store, test config. Used by the test suite.
    pub fn build_test(run_id: RunId, seed: u64, world: World) -> SimResult<Self> {
        let store = SimStore::in_memory()?;
        store.migrate()?;
        store.insert_run(&run_id, seed, "0.1.0-test")?;
        Ok(Self::new(run_id, seed, store, &SimConfig::default_test(), world))
    }

    /// Advance one tick. This is the core simulation step.
    pub fn tick(&mut self) -> SimResult<Vec<SimEvent>> {
        assert!(!self.clock.paused, "tick() called on paused engine");

        let current_tick = self.clock.advance();
        let mut tick_events: Vec<SimEvent> = vec![
            SimEvent::TickStarted { tick: current_tick }
        ];

        let subsystems: [(SubsystemSlot, &mut dyn SimSubsystem); 4] = [
            (SubsystemSlot::Colonization, &mut self.colonization),
            (SubsystemSlot::Development,  &mut self.development),
            (SubsystemSlot::Building,     &mut self.building),
            (SubsystemSlot::Technology,   &mut self.technology),
        ];

        for (slot, subsystem) in subsystems {
            let mut rng = self.rng_bank.for_subsystem_at_tick(slot, current_tick);
            let new_events = subsystem.update(current_tick, &mut self.world, &mut rng)?;
            for event in &new_events {
                record(&self.store, &self.run_id, current_tick, subsystem.name(), event)?;
            }
            tick_events.extend(new_events);
        }

        tick_events.push(SimEvent::TickCompleted { tick: current_tick });

        if current_tick % SNAPSHOT_INTERVAL == 0 {
            self.take_snapshot(current_tick)?;
        }

        Ok(tick_events)
    }

    /// Run n ticks in a loop. Used for testing and fast-forward.
    pub fn run_ticks(&mut self, n: u64) -> SimResult<()> {
        self.record_run_initialized()?;
        self.clock.resume();
        for _ in 0..n {
            self.tick()?;
        }
        self.clock.pause();
        Ok(())
    }

    /// The once-per-day entry point for a host driver: advance every
    /// registry by exactly one tick and return what happened.
    pub fn advance_all_registries(&mut self) -> SimResult<Vec<SimEvent>> {
        self.record_run_initialized()?;
        self.clock.resume();
        let result = self.tick();
        self.clock.pause();
        result
    }

    fn record_run_initialized(&self) -> SimResult<()> {
        // Emit RunInitialized at tick 0 so seed differences are observable.
        if self.clock.current_tick == 0 && self.store.event_count(&self.run_id, "run_initialized")? == 0 {
            let init_event = SimEvent::RunInitialized {
                run_id: self.run_id.clone(),
                seed: self.seed,
            };
            record(&self.store, &self.run_id, 0, "engine", &init_event)?;
        }
        Ok(())
    }

    // ── Commands ───────────────────────────────────────────────

    pub fn start_colonization(&mut self, country: &str, province_id: &str, colonists: u32) -> SimResult<TaskId> {
        self.command_seq += 1;
        let mut rng = self.rng_bank.for_command(SubsystemSlot::Colonization, self.command_seq);
        let mission_id = self
            .colonization
            .start_colonization(&self.world, country, province_id, colonists, &mut rng)
            .inspect_err(|e| log::warn!("Colonization {country} -> {province_id} refused: {e}"))?;

        let tick = self.clock.current_tick;
        if let Some(mission) = self.colonization.mission(&mission_id) {
            let mut events = vec![SimEvent::ColonizationStarted {
                tick,
                mission_id: mission_id.clone(),
                country: country.to_string(),
                province_id: province_id.to_string(),
                colonists,
                max_duration_days: mission.max_duration_days(),
            }];
            events.extend(mission.events.iter().map(|e| SimEvent::ColonizationEventOccurred {
                tick,
                mission_id: mission_id.clone(),
                province_id: province_id.to_string(),
                category: e.category,
                name: e.name.clone(),
            }));
            for event in &events {
                record(&self.store, &self.run_id, tick, "colonization", event)?;
            }
        }
        Ok(mission_id)
    }

    pub fn start_development_project(
        &mut self,
        province_id: &str,
        kind: DevelopmentKind,
        workers: u64,
    ) -> SimResult<TaskId> {
        let id = self
            .development
            .start_project(&mut self.world, province_id, kind, workers)
            .inspect_err(|e| log::warn!("Development project in {province_id} refused: {e}"))?;
        let total_work = self.development.project(&id).map_or(0, |p| p.total_work());
        self.record_project_started(&id, "development", province_id, kind.label(), workers, total_work)?;
        Ok(id)
    }

    pub fn start_building_project(
        &mut self,
        province_id: &str,
        kind: BuildingKind,
        workers: u64,
    ) -> SimResult<TaskId> {
        let id = self
            .building
            .start_project(&mut self.world, province_id, kind, workers)
            .inspect_err(|e| log::warn!("Building project in {province_id} refused: {e}"))?;
        let total_work = self.building.project(&id).map_or(0, |p| p.total_work());
        self.record_project_started(&id, "building", province_id, kind.label(), workers, total_work)?;
        Ok(id)
    }

    fn record_project_started(
        &self,
        id: &str,
        family: &str,
        province_id: &str,
        kind: &str,
        workers: u64,
        total_work: u64,
    ) -> SimResult<()> {
        let tick = self.clock.current_tick;
        let event = SimEvent::ProjectStarted {
            tick,
            project_id: id.to_string(),
            family: family.to_string(),
            province_id: province_id.to_string(),
            kind: kind.to_string(),
            workers,
            total_work,
        };
        record(&self.store, &self.run_id, tick, family, &event)
    }

    /// Cancel any live mission or project by id. Workers withheld by a
    /// project return to their province. Unknown ids return `Ok(false)`.
    pub fn cancel_task(&mut self, task_id: &str) -> SimResult<bool> {
        let cancelled: Option<(&'static str, ProvinceId)> =
            if let Some(m) = self.colonization.cancel(task_id, &mut self.world) {
                Some(("colonization", m.province_id))
            } else if let Some(p) = self.development.cancel(task_id, &mut self.world) {
                Some(("development", p.province_id))
            } else {
                self.building
                    .cancel(task_id, &mut self.world)
                    .map(|p| ("building", p.province_id))
            };

        let Some((family, province_id)) = cancelled else {
            return Ok(false);
        };
        let tick = self.clock.current_tick;
        let event = SimEvent::TaskCancelled {
            tick,
            task_id: task_id.to_string(),
            family: family.to_string(),
            province_id,
        };
        record(&self.store, &self.run_id, tick, family, &event)?;
        Ok(true)
    }

    pub fn start_research(&mut self, country: &str, technology: &str) -> SimResult<()> {
        self.technology
            .start_research(&self.world, country, technology)
            .inspect_err(|e| log::warn!("Research {country}/{technology} refused: {e}"))?;
        let tick = self.clock.current_tick;
        let event = SimEvent::ResearchStarted {
            tick,
            country: country.to_string(),
            technology: technology.to_string(),
        };
        record(&self.store, &self.run_id, tick, "technology", &event)
    }

    pub fn stop_research(&mut self, country: &str, technology: &str) -> SimResult<bool> {
        if !self.technology.stop_research(country, technology) {
            return Ok(false);
        }
        let tick = self.clock.current_tick;
        let event = SimEvent::ResearchStopped {
            tick,
            country: country.to_string(),
            technology: technology.to_string(),
        };
        record(&self.store, &self.run_id, tick, "technology", &event)?;
        Ok(true)
    }

    pub fn grant_technology(&mut self, country: &str, technology: &str) -> SimResult<()> {
        self.technology.grant_technology(country, technology)?;
        let tick = self.clock.current_tick;
        let event = SimEvent::TechnologyGranted {
            tick,
            country: country.to_string(),
            technology: technology.to_string(),
        };
        record(&self.store, &self.run_id, tick, "technology", &event)
    }

    /// Route a host command to the matching operation.
    pub fn apply_command(&mut self, command: &PlayerCommand) -> SimResult<CommandOutcome> {
        let started = |task_id| CommandOutcome::TaskStarted { task_id };
        match command {
            PlayerCommand::Colonize { country, province_id, colonists } => {
                self.start_colonization(country, province_id, *colonists).map(started)
            }
            PlayerCommand::Develop { province_id, kind, workers } => {
                self.start_development_project(province_id, *kind, *workers).map(started)
            }
            PlayerCommand::Build { province_id, kind, workers } => {
                self.start_building_project(province_id, *kind, *workers).map(started)
            }
            PlayerCommand::Research { country, technology } => {
                self.start_research(country, technology)?;
                Ok(CommandOutcome::Applied)
            }
            PlayerCommand::StopResearch { country, technology } => {
                Ok(applied_or_noop(self.stop_research(country, technology)?))
            }
            PlayerCommand::Grant { country, technology } => {
                self.grant_technology(country, technology)?;
                Ok(CommandOutcome::Applied)
            }
            PlayerCommand::Cancel { task_id } => Ok(applied_or_noop(self.cancel_task(task_id)?)),
        }
    }

    // ── Queries ────────────────────────────────────────────────

    pub fn active_missions(&self) -> &[ColonizationMission] {
        self.colonization.active_missions()
    }

    pub fn colonizable_provinces(&self) -> Vec<ProvinceId> {
        self.colonization.colonizable_provinces(&self.world)
    }

    /// Query events for a specific tick from the store.
    /// Used by the determinism test and replay tooling.
    pub fn store_events_for_tick(
        &self,
        run_id: &str,
        tick: Tick,
    ) -> SimResult<Vec<EventLogEntry>> {
        self.store.events_for_tick(run_id, tick)
    }

    pub fn snapshot(&self) -> SimSnapshot<'_> {
        SimSnapshot {
            run_id:       &self.run_id,
            tick:         self.clock.current_tick,
            date:         self.clock.date(),
            clock:        &self.clock,
            world:        &self.world,
            colonization: self.colonization.active_missions(),
            development:  self.development.active_projects(),
            building:     self.building.active_projects(),
            research:     self.technology.active_research(),
            known_technologies: self
                .world
                .countries()
                .map(|c| (c.name.as_str(), self.technology.known_technologies(&c.name)))
                .collect(),
        }
    }

    fn take_snapshot(&self, tick: Tick) -> SimResult<()> {
        let json = serde_json::to_string(&self.snapshot())?;
        self.store.save_snapshot(&self.run_id, tick, &json)?;
        log::debug!("Snapshot saved at tick {tick}");
        Ok(())
    }
}

fn applied_or_noop(acted: bool) -> CommandOutcome {
    if acted { CommandOutcome::Applied } else { CommandOutcome::NoOp }
}

fn record(store: &SimStore, run_id: &str, tick: Tick, subsystem: &str, event: &SimEvent) -> SimResult<()> {
    let entry = EventLogEntry {
        id:         None,
        run_id:     run_id.to_string(),
        tick,
        subsystem:  subsystem.to_string(),
        event_type: event.type_name().to_string(),
        payload:    serde_json::to_string(event).map_err(SimError::from)?,
    };
    store.append_event(&entry)
}
