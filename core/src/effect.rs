//! Typed effects and the resolver that applies them to the world map.
//!
//! RULE: Every mutation a completed task makes goes through
//! [`apply_effect`]. The resolver does not know why an effect fired;
//! colonization events, development completions and building
//! completions all share it.

use crate::{
    types::CountryName,
    world::{Modifier, PopClass, WorldMap},
};
use serde::{Deserialize, Serialize};

/// A single world mutation. Floors apply only when the delta is negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Effect {
    DevelopmentDelta {
        delta: f64,
        #[serde(default)]
        floor: Option<f64>,
    },
    PopulationDelta {
        class: PopClass,
        delta: i64,
        #[serde(default)]
        floor: u64,
    },
    /// Applied to the country currently owning the province.
    TreasuryDelta {
        delta: f64,
        #[serde(default)]
        floor: Option<f64>,
    },
    /// Applied to the country currently owning the province. Unbounded.
    StabilityDelta {
        delta: f64,
    },
    AddModifier {
        modifier: Modifier,
    },
    AddBuilding {
        building: String,
    },
    /// Hand the province to `country` and register it with that country.
    TransferOwnership {
        country: CountryName,
    },
}

impl Effect {
    pub fn development(delta: f64) -> Self {
        Self::DevelopmentDelta { delta, floor: None }
    }

    pub fn population(class: PopClass, delta: i64) -> Self {
        Self::PopulationDelta { class, delta, floor: 0 }
    }

    pub fn modifier(modifier: Modifier) -> Self {
        Self::AddModifier { modifier }
    }
}

/// What happened when an effect was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectOutcome {
    Applied,
    /// The province, or the country the effect needed, could not be
    /// resolved. Nothing was mutated.
    Skipped(String),
}

impl EffectOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Apply one effect to `province_id` (and its owning country where the
/// effect is country-level).
pub fn apply_effect(world: &mut dyn WorldMap, province_id: &str, effect: &Effect) -> EffectOutcome {
    let Some(province) = world.province_mut(province_id) else {
        return EffectOutcome::Skipped(format!("province '{province_id}' not found"));
    };

    match effect {
        Effect::DevelopmentDelta { delta, floor } => {
            province.development = floored(province.development, *delta, *floor);
        }
        Effect::PopulationDelta { class, delta, floor } => {
            let current = province.pop(*class);
            let next = if *delta < 0 {
                current.saturating_sub(delta.unsigned_abs()).max(*floor)
            } else {
                current.saturating_add(*delta as u64)
            };
            province.set_pop(*class, next);
        }
        Effect::AddModifier { modifier } => {
            province.add_modifier(modifier.clone());
        }
        Effect::AddBuilding { building } => {
            province.add_building(building.clone());
        }
        Effect::TreasuryDelta { delta, floor } => {
            let owner = province.owner.clone();
            let Some(country) = world.country_mut(&owner) else {
                return EffectOutcome::Skipped(format!("owner '{owner}' not found"));
            };
            country.treasury = floored(country.treasury, *delta, *floor);
        }
        Effect::StabilityDelta { delta } => {
            let owner = province.owner.clone();
            let Some(country) = world.country_mut(&owner) else {
                return EffectOutcome::Skipped(format!("owner '{owner}' not found"));
            };
            country.stability += delta;
        }
        Effect::TransferOwnership { country } => {
            if world.country(country).is_none() {
                return EffectOutcome::Skipped(format!("country '{country}' not found"));
            }
            let previous = match world.province_mut(province_id) {
                Some(p) => std::mem::replace(&mut p.owner, country.clone()),
                None => return EffectOutcome::Skipped(format!("province '{province_id}' not found")),
            };
            if let Some(old) = world.country_mut(&previous) {
                old.provinces.retain(|p| p != province_id);
            }
            if let Some(new_owner) = world.country_mut(country) {
                new_owner.add_province(province_id);
            }
        }
    }
    EffectOutcome::Applied
}

/// Apply effects in order. Returns how many were skipped.
pub fn apply_all(world: &mut dyn WorldMap, province_id: &str, effects: &[Effect]) -> usize {
    effects
        .iter()
        .map(|effect| apply_effect(world, province_id, effect))
        .filter(|outcome| !outcome.is_applied())
        .count()
}

fn floored(current: f64, delta: f64, floor: Option<f64>) -> f64 {
    let next = current + delta;
    match floor {
        Some(f) if delta < 0.0 => next.max(f),
        _ => next,
    }
}
