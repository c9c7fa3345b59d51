//! Colonization event catalog and the weighted generator that draws
//! from it.
//!
//! A draw is two rolls: one uniform sample picks the category through a
//! [`CategoryPartition`], a second picks a template uniformly inside
//! that category. Templates carry typed effects, never prose to parse.

use crate::{effect::Effect, rng::SubsystemRng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Positive,
    Negative,
    Neutral,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral  => "neutral",
        }
    }
}

/// Split of [0, 1) into positive / negative / neutral.
/// `[0, positive_below)` is positive, `[positive_below, negative_below)`
/// negative, the rest neutral.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryPartition {
    pub positive_below: f64,
    pub negative_below: f64,
}

impl CategoryPartition {
    /// Partition used for the events rolled when a mission starts.
    pub const INITIAL: Self = Self { positive_below: 0.4, negative_below: 0.7 };
    /// Partition used for events rolled while a mission is underway.
    pub const IN_FLIGHT: Self = Self { positive_below: 0.3, negative_below: 0.6 };

    pub fn category_for(&self, roll: f64) -> EventCategory {
        if roll < self.positive_below {
            EventCategory::Positive
        } else if roll < self.negative_below {
            EventCategory::Negative
        } else {
            EventCategory::Neutral
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTemplate {
    pub name: String,
    #[serde(default)]
    pub effects: Vec<Effect>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventCatalog {
    pub positive: Vec<EventTemplate>,
    pub negative: Vec<EventTemplate>,
    pub neutral:  Vec<EventTemplate>,
}

impl EventCatalog {
    pub fn templates(&self, category: EventCategory) -> &[EventTemplate] {
        match category {
            EventCategory::Positive => &self.positive,
            EventCategory::Negative => &self.negative,
            EventCategory::Neutral  => &self.neutral,
        }
    }

    /// The built-in catalog of the base game.
    pub fn standard() -> Self {
        use crate::world::{Modifier, PopClass};

        fn t(name: &str, effects: Vec<Effect>) -> EventTemplate {
            EventTemplate { name: name.to_string(), effects }
        }
        let pop_loss = || Effect::PopulationDelta {
            class: PopClass::Peasants,
            delta: -1000,
            floor: 100,
        };
        let dev_loss = || Effect::DevelopmentDelta { delta: -1.0, floor: Some(1.0) };

        Self {
            positive: vec![
                t("Fertile land discovered", vec![Effect::development(2.0)]),
                t("Native cooperation", vec![Effect::population(PopClass::Peasants, 1000)]),
                t("Rich resources found", vec![Effect::TreasuryDelta { delta: 3.0, floor: None }]),
                t("Strategic location", vec![Effect::modifier(Modifier::flat("Trade Power", 1))]),
                t("Natural harbor", vec![Effect::modifier(Modifier::flat("Naval Capacity", 2))]),
                t("Mountain passes", vec![Effect::modifier(Modifier::flat("Military Defense", 1))]),
                t("River system", vec![Effect::modifier(Modifier::flat("Trade Routes", 2))]),
                t("Mineral deposits", vec![Effect::modifier(Modifier::flat("Production", 1))]),
            ],
            negative: vec![
                t("Disease outbreak", vec![pop_loss()]),
                t("Hostile natives", vec![Effect::StabilityDelta { delta: -1.0 }]),
                t("Poor soil", vec![dev_loss()]),
                t("Dangerous wildlife", vec![Effect::modifier(Modifier::flat("Low Morale", -1))]),
                t("Harsh climate", vec![pop_loss()]),
                t("Isolation", vec![Effect::modifier(Modifier::flat("Trade Power", -1))]),
                t("Resource scarcity", vec![Effect::TreasuryDelta { delta: -1.0, floor: Some(0.0) }]),
                t("Geographic barriers", vec![dev_loss()]),
            ],
            neutral: vec![
                t("Uneventful journey", vec![]),
                t("Standard conditions", vec![]),
                t("Mixed results", vec![]),
                t("Learning experience", vec![Effect::modifier(Modifier::flat("Colonization Experience", 1))]),
                t("Cultural exchange", vec![Effect::modifier(Modifier::flat("Cultural Exchange", 1))]),
            ],
        }
    }
}

/// One drawn event, owned by the mission that drew it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColonizationEvent {
    pub category:    EventCategory,
    pub name:        String,
    pub effects:     Vec<Effect>,
    /// Days this event has existed. Informational only.
    pub age_in_days: u32,
}

impl ColonizationEvent {
    pub fn age(&mut self) {
        self.age_in_days += 1;
    }
}

/// Weighted draws against a catalog.
#[derive(Debug, Clone)]
pub struct EventGenerator {
    catalog:   EventCatalog,
    initial:   CategoryPartition,
    in_flight: CategoryPartition,
}

impl EventGenerator {
    pub fn new(catalog: EventCatalog, initial: CategoryPartition, in_flight: CategoryPartition) -> Self {
        Self { catalog, initial, in_flight }
    }

    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    /// Draw `count` events with the start-of-mission partition.
    pub fn draw_initial(&self, count: u64, rng: &mut SubsystemRng) -> Vec<ColonizationEvent> {
        (0..count)
            .filter_map(|_| self.draw(&self.initial, rng))
            .collect()
    }

    /// Draw one event with the underway partition.
    pub fn draw_in_flight(&self, rng: &mut SubsystemRng) -> Option<ColonizationEvent> {
        self.draw(&self.in_flight, rng)
    }

    fn draw(&self, partition: &CategoryPartition, rng: &mut SubsystemRng) -> Option<ColonizationEvent> {
        let category = partition.category_for(rng.next_f64());
        let templates = self.catalog.templates(category);
        if templates.is_empty() {
            log::warn!("event catalog has no {} templates", category.as_str());
            return None;
        }
        let template = &templates[rng.next_u64_below(templates.len() as u64) as usize];
        Some(ColonizationEvent {
            category,
            name: template.name.clone(),
            effects: template.effects.clone(),
            age_in_days: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SubsystemRng;

    #[test]
    fn initial_partition_boundaries() {
        let p = CategoryPartition::INITIAL;
        assert_eq!(p.category_for(0.0), EventCategory::Positive);
        assert_eq!(p.category_for(0.399), EventCategory::Positive);
        assert_eq!(p.category_for(0.4), EventCategory::Negative);
        assert_eq!(p.category_for(0.699), EventCategory::Negative);
        assert_eq!(p.category_for(0.7), EventCategory::Neutral);
        assert_eq!(p.category_for(0.999), EventCategory::Neutral);
    }

    #[test]
    fn in_flight_partition_is_less_favourable() {
        let p = CategoryPartition::IN_FLIGHT;
        assert_eq!(p.category_for(0.35), EventCategory::Negative);
        assert_eq!(p.category_for(0.3), EventCategory::Negative);
        assert_eq!(p.category_for(0.29), EventCategory::Positive);
        assert_eq!(p.category_for(0.6), EventCategory::Neutral);
    }

    /// A roll in [0.3, 0.4) is positive at mission start but negative
    /// once the mission is underway.
    #[test]
    fn in_flight_draw_turns_a_mid_roll_negative() {
        let generator = EventGenerator::new(
            EventCatalog::standard(),
            CategoryPartition::INITIAL,
            CategoryPartition::IN_FLIGHT,
        );
        let seed = (0..10_000u64)
            .find(|&seed| (0.3..0.4).contains(&SubsystemRng::new(seed, 0).next_f64()))
            .expect("a seed whose first roll is in [0.3, 0.4)");

        let underway = generator.draw_in_flight(&mut SubsystemRng::new(seed, 0)).unwrap();
        assert_eq!(underway.category, EventCategory::Negative);
        assert_eq!(underway.age_in_days, 0);

        let at_start = generator.draw_initial(1, &mut SubsystemRng::new(seed, 0));
        assert_eq!(at_start[0].category, EventCategory::Positive);
    }

    #[test]
    fn standard_catalog_shape() {
        let c = EventCatalog::standard();
        assert_eq!(c.positive.len(), 8);
        assert_eq!(c.negative.len(), 8);
        assert_eq!(c.neutral.len(), 5);
    }

    #[test]
    fn draws_come_from_the_catalog() {
        let generator = EventGenerator::new(
            EventCatalog::standard(),
            CategoryPartition::INITIAL,
            CategoryPartition::IN_FLIGHT,
        );
        let mut rng = SubsystemRng::new(2024, 0);
        let events = generator.draw_initial(200, &mut rng);
        assert_eq!(events.len(), 200);
        for event in &events {
            let names: Vec<&str> = generator
                .catalog()
                .templates(event.category)
                .iter()
                .map(|t| t.name.as_str())
                .collect();
            assert!(names.contains(&event.name.as_str()), "{} not in {:?}", event.name, event.category);
        }
        // 200 draws at 40/30/30 will hit every category.
        for cat in [EventCategory::Positive, EventCategory::Negative, EventCategory::Neutral] {
            assert!(events.iter().any(|e| e.category == cat), "no {cat:?} drawn");
        }
    }
}
