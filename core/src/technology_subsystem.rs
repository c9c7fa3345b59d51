//! Technology research.
//!
//! Research is two-phase. Ticking a [`ResearchProgress`] to its required
//! days only marks it complete; the technology becomes known when the
//! driver calls [`TechnologySubsystem::grant_technology`]. The known set
//! is what later prerequisite checks read.

use crate::{
    config::{SimConfig, TechnologyConfig},
    error::{RejectReason, SimResult},
    event::SimEvent,
    rng::SubsystemRng,
    subsystem::SimSubsystem,
    task::{TaskState, WorkProgress},
    types::{CountryName, Tick},
    world::WorldMap,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Research advances by one unit per day.
pub const RESEARCH_PER_TICK: u64 = 1;

/// Categories whose higher levels also require levels 1 and 2 directly.
pub const CORE_CATEGORIES: [&str; 4] = ["Military", "Diplomatic", "Administrative", "Trade"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technology {
    pub name:          String,
    pub category:      String,
    pub level:         u32,
    pub research_cost: f64,
    /// Days of research required.
    pub research_time: u32,
    pub prerequisites: BTreeSet<String>,
}

impl Technology {
    /// Level-derived cost and time. Prerequisites are the category chain
    /// `<Category>_<level - 1>`, plus `<Category>_1` from level 2 and
    /// `<Category>_2` from level 3 for the core categories.
    pub fn new(name: impl Into<String>, category: impl Into<String>, level: u32) -> Self {
        let category = category.into();
        let mut prerequisites = BTreeSet::new();
        if level > 1 {
            prerequisites.insert(format!("{category}_{}", level - 1));
        }
        if CORE_CATEGORIES.contains(&category.as_str()) {
            for base in (1..=2).filter(|&base| level > base) {
                prerequisites.insert(format!("{category}_{base}"));
            }
        }
        Self {
            name: name.into(),
            category,
            level,
            research_cost: f64::from(level) * 100.0,
            research_time: level * 30,
            prerequisites,
        }
    }

    pub fn from_config(config: &TechnologyConfig) -> Self {
        let mut tech = Self::new(&config.name, &config.category, config.level);
        tech.prerequisites.extend(config.prerequisites.iter().cloned());
        if let Some(days) = config.research_time {
            tech.research_time = days;
        }
        tech
    }

    pub fn description(&self) -> String {
        format!("{} level {} - {} technology", self.name, self.level, self.category)
    }
}

/// One country's accumulation toward one technology.
#[derive(Debug, Clone, Serialize)]
pub struct ResearchProgress {
    pub country:    CountryName,
    pub technology: String,
    pub work:       WorkProgress,
}

impl ResearchProgress {
    fn new(country: &str, technology: &Technology) -> Self {
        Self {
            country: country.to_string(),
            technology: technology.name.clone(),
            work: WorkProgress::new(1, RESEARCH_PER_TICK, u64::from(technology.research_time)),
        }
    }

    pub fn ticks_accumulated(&self) -> u64 {
        self.work.progress
    }

    pub fn is_completed(&self) -> bool {
        self.work.completed
    }

    pub fn state(&self) -> TaskState {
        self.work.state()
    }

    pub fn fraction(&self) -> f64 {
        self.work.fraction()
    }

    fn matches(&self, country: &str, technology: &str) -> bool {
        self.country == country && self.technology == technology
    }
}

pub struct TechnologySubsystem {
    technologies: BTreeMap<String, Technology>,
    known:        BTreeMap<CountryName, BTreeSet<String>>,
    research:     Vec<ResearchProgress>,
}

impl TechnologySubsystem {
    pub fn new(config: &SimConfig) -> Self {
        let technologies = config
            .technologies
            .iter()
            .map(|t| (t.name.clone(), Technology::from_config(t)))
            .collect();
        Self {
            technologies,
            known: BTreeMap::new(),
            research: Vec::new(),
        }
    }

    pub fn technology(&self, name: &str) -> Option<&Technology> {
        self.technologies.get(name)
    }

    pub fn all_technologies(&self) -> impl Iterator<Item = &Technology> {
        self.technologies.values()
    }

    pub fn has_technology(&self, country: &str, technology: &str) -> bool {
        self.known
            .get(country)
            .is_some_and(|set| set.contains(technology))
    }

    pub fn known_technologies(&self, country: &str) -> Vec<String> {
        self.known
            .get(country)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Grant a technology outright, e.g. a country's starting techs.
    pub fn seed_known_technology(&mut self, country: &str, technology: &str) {
        self.known
            .entry(country.to_string())
            .or_default()
            .insert(technology.to_string());
    }

    /// Prerequisites of `technology` the country does not know yet.
    pub fn missing_prerequisites(&self, country: &str, technology: &str) -> Vec<String> {
        let Some(tech) = self.technologies.get(technology) else {
            return Vec::new();
        };
        tech.prerequisites
            .iter()
            .filter(|p| !self.has_technology(country, p))
            .cloned()
            .collect()
    }

    /// False when already known, unknown to the catalog, or when any
    /// prerequisite is missing from the known set.
    pub fn can_research(&self, country: &str, technology: &str) -> bool {
        self.technologies.contains_key(technology)
            && !self.has_technology(country, technology)
            && self.missing_prerequisites(country, technology).is_empty()
    }

    pub fn start_research(
        &mut self,
        world: &dyn WorldMap,
        country: &str,
        technology: &str,
    ) -> SimResult<()> {
        if world.country(country).is_none() {
            return Err(RejectReason::UnknownCountry(country.to_string()).into());
        }
        let tech = self
            .technologies
            .get(technology)
            .ok_or_else(|| RejectReason::UnknownTechnology(technology.to_string()))?;
        if self.research.iter().any(|r| r.matches(country, technology)) {
            return Err(RejectReason::ResearchAlreadyActive {
                country: country.to_string(),
                technology: technology.to_string(),
            }
            .into());
        }
        if self.has_technology(country, technology) {
            return Err(RejectReason::AlreadyKnown {
                country: country.to_string(),
                technology: technology.to_string(),
            }
            .into());
        }
        let missing = self.missing_prerequisites(country, technology);
        if !missing.is_empty() {
            return Err(RejectReason::PrerequisitesMissing {
                country: country.to_string(),
                technology: technology.to_string(),
                missing,
            }
            .into());
        }

        let progress = ResearchProgress::new(country, tech);
        log::info!("{country} started researching {technology} ({} days)", tech.research_time);
        self.research.push(progress);
        Ok(())
    }

    /// Drop an in-progress (or completed, ungranted) research.
    /// Returns false when there was nothing to stop.
    pub fn stop_research(&mut self, country: &str, technology: &str) -> bool {
        let before = self.research.len();
        self.research.retain(|r| !r.matches(country, technology));
        before != self.research.len()
    }

    /// True while research is accumulating (not yet complete).
    pub fn is_researching(&self, country: &str, technology: &str) -> bool {
        self.progress(country, technology)
            .is_some_and(|r| !r.is_completed())
    }

    /// True when research finished and awaits [`Self::grant_technology`].
    pub fn is_research_complete(&self, country: &str, technology: &str) -> bool {
        self.progress(country, technology)
            .is_some_and(ResearchProgress::is_completed)
    }

    pub fn research_progress_fraction(&self, country: &str, technology: &str) -> Option<f64> {
        self.progress(country, technology).map(ResearchProgress::fraction)
    }

    pub fn progress(&self, country: &str, technology: &str) -> Option<&ResearchProgress> {
        self.research.iter().find(|r| r.matches(country, technology))
    }

    pub fn active_research(&self) -> &[ResearchProgress] {
        &self.research
    }

    /// Move a completed research into the country's known set.
    pub fn grant_technology(&mut self, country: &str, technology: &str) -> SimResult<()> {
        let index = self
            .research
            .iter()
            .position(|r| r.matches(country, technology) && r.is_completed())
            .ok_or_else(|| RejectReason::ResearchNotComplete {
                country: country.to_string(),
                technology: technology.to_string(),
            })?;
        self.research.remove(index);
        self.seed_known_technology(country, technology);
        log::info!("{country} now knows {technology}");
        Ok(())
    }

    /// Technologies the country does not know yet.
    pub fn available_technologies(&self, country: &str) -> Vec<&Technology> {
        self.technologies
            .values()
            .filter(|t| !self.has_technology(country, &t.name))
            .collect()
    }

    /// Technologies the country could start researching right now.
    pub fn researchable_technologies(&self, country: &str) -> Vec<&Technology> {
        self.technologies
            .values()
            .filter(|t| self.can_research(country, &t.name))
            .filter(|t| self.progress(country, &t.name).is_none())
            .collect()
    }
}

impl SimSubsystem for TechnologySubsystem {
    fn name(&self) -> &'static str { "technology" }

    fn update(
        &mut self,
        tick: Tick,
        world: &mut dyn WorldMap,
        _rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        let mut events = Vec::new();

        let (live, orphaned): (Vec<_>, Vec<_>) = std::mem::take(&mut self.research)
            .into_iter()
            .partition(|r| world.country(&r.country).is_some());
        self.research = live;
        for r in orphaned {
            log::warn!("{} no longer exists; dropping research of {}", r.country, r.technology);
            events.push(SimEvent::ResearchStopped {
                tick,
                country: r.country,
                technology: r.technology,
            });
        }

        for r in self.research.iter_mut().filter(|r| !r.is_completed()) {
            r.work.advance();
            if r.is_completed() {
                log::info!("{} finished researching {}", r.country, r.technology);
                events.push(SimEvent::ResearchCompleted {
                    tick,
                    country: r.country.clone(),
                    technology: r.technology.clone(),
                });
            }
        }
        Ok(events)
    }
}
