use crate::{
    catalog::{CategoryPartition, EventCatalog},
    technology_subsystem::Technology,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColonizationConfig {
    pub min_colonists: u32,
    pub max_colonists: u32,
    /// Mission length is `base_duration_days + colonists / colonists_per_extra_day`.
    pub base_duration_days: u32,
    pub colonists_per_extra_day: u32,
    pub initial_events_min: u64,
    pub initial_events_max: u64,
    /// Per-tick chance of one more event while a mission is underway.
    pub in_flight_event_chance: f64,
    pub initial_partition: CategoryPartition,
    pub in_flight_partition: CategoryPartition,
}

impl Default for ColonizationConfig {
    fn default() -> Self {
        Self {
            min_colonists: 100,
            max_colonists: 1000,
            base_duration_days: 30,
            colonists_per_extra_day: 100,
            initial_events_min: 2,
            initial_events_max: 4,
            in_flight_event_chance: 0.10,
            initial_partition: CategoryPartition::INITIAL,
            in_flight_partition: CategoryPartition::IN_FLIGHT,
        }
    }
}

impl ColonizationConfig {
    pub fn max_duration_days(&self, colonists: u32) -> u32 {
        self.base_duration_days + colonists / self.colonists_per_extra_day.max(1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnologyConfig {
    pub name: String,
    pub category: String,
    pub level: u32,
    /// Extra prerequisites on top of the category chain.
    #[serde(default)]
    pub prerequisites: Vec<String>,
    /// Overrides the level-derived research time.
    #[serde(default)]
    pub research_time: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
struct TechTreeFile {
    technologies: Vec<TechnologyConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub colonization: ColonizationConfig,
    pub event_catalog: EventCatalog,
    pub technologies: Vec<TechnologyConfig>,
}

impl SimConfig {
    /// Load all game data from `data_dir`.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let colonization_path = format!("{data_dir}/colonization/colonization.json");
        let colonization_content = std::fs::read_to_string(&colonization_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {colonization_path}: {e}"))?;
        let colonization: ColonizationConfig = serde_json::from_str(&colonization_content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {colonization_path}: {e}"))?;

        let catalog_path = format!("{data_dir}/colonization/event_catalog.json");
        let catalog_content = std::fs::read_to_string(&catalog_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {catalog_path}: {e}"))?;
        let event_catalog: EventCatalog = serde_json::from_str(&catalog_content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {catalog_path}: {e}"))?;

        let tech_path = format!("{data_dir}/technology/tech_tree.json");
        let tech_content = std::fs::read_to_string(&tech_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {tech_path}: {e}"))?;
        let tech_file: TechTreeFile = serde_json::from_str(&tech_content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {tech_path}: {e}"))?;

        let config = Self {
            colonization,
            event_catalog,
            technologies: tech_file.technologies,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject data the simulation cannot run: inverted ranges, bad
    /// partitions, and technologies that could never be researched.
    pub fn validate(&self) -> anyhow::Result<()> {
        let c = &self.colonization;
        if c.min_colonists > c.max_colonists {
            anyhow::bail!("min_colonists {} exceeds max_colonists {}", c.min_colonists, c.max_colonists);
        }
        if c.initial_events_min > c.initial_events_max {
            anyhow::bail!("initial event range {}..={} is empty", c.initial_events_min, c.initial_events_max);
        }
        for p in [&c.initial_partition, &c.in_flight_partition] {
            if !(0.0..=1.0).contains(&p.positive_below) || p.positive_below > p.negative_below || p.negative_below > 1.0 {
                anyhow::bail!("bad category partition {p:?}");
            }
        }

        let mut names = BTreeSet::new();
        for t in &self.technologies {
            if t.level == 0 {
                anyhow::bail!("technology {} has level 0", t.name);
            }
            if t.research_time == Some(0) {
                anyhow::bail!("technology {} has a research time of 0 days", t.name);
            }
            if !names.insert(t.name.as_str()) {
                anyhow::bail!("technology {} is defined twice", t.name);
            }
        }
        for t in &self.technologies {
            let tech = Technology::from_config(t);
            if let Some(missing) = tech.prerequisites.iter().find(|p| !names.contains(p.as_str())) {
                anyhow::bail!("technology {} requires unknown technology {missing}", t.name);
            }
        }
        Ok(())
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        let tech = |name: &str, category: &str, level: u32, extra: &[&str]| TechnologyConfig {
            name: name.into(),
            category: category.into(),
            level,
            prerequisites: extra.iter().map(|s| s.to_string()).collect(),
            research_time: None,
        };

        let mut technologies = Vec::new();
        for category in ["Military", "Diplomatic", "Administrative", "Trade"] {
            for level in 1..=3 {
                technologies.push(tech(&format!("{category}_{level}"), category, level, &[]));
            }
        }
        technologies.push(tech("Naval_1", "Military", 1, &[]));
        technologies.push(tech("Naval_2", "Military", 2, &["Naval_1"]));
        technologies.push(tech("Infrastructure_1", "Administrative", 1, &[]));

        Self {
            colonization: ColonizationConfig::default(),
            event_catalog: EventCatalog::standard(),
            technologies,
        }
    }
}
