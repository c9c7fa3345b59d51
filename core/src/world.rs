//! The world-map collaborator: provinces and countries.
//!
//! RULE: The simulation core never owns provinces or countries. Tasks
//! hold ids only and resolve them through [`WorldMap`] at the moment
//! they need to read or mutate. A lookup that comes back `None` is a
//! normal outcome, not an error.

use crate::types::{CountryName, ProvinceId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Owner value of a province nobody holds yet.
pub const UNOWNED: &str = "Uninhabited";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopClass {
    Nobles,
    CityFolk,
    Craftsmen,
    Peasants,
    Slaves,
    Serfs,
    Soldiers,
}

impl PopClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nobles    => "nobles",
            Self::CityFolk  => "city_folk",
            Self::Craftsmen => "craftsmen",
            Self::Peasants  => "peasants",
            Self::Slaves    => "slaves",
            Self::Serfs     => "serfs",
            Self::Soldiers  => "soldiers",
        }
    }
}

/// Typed magnitude of a modifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "snake_case")]
pub enum Magnitude {
    Flat(i32),
    Percent(i32),
}

/// A persistent named bonus or penalty. Modifiers are append-only here;
/// decay and expiry belong to whoever consumes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub name: String,
    #[serde(default)]
    pub magnitude: Option<Magnitude>,
}

impl Modifier {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), magnitude: None }
    }

    pub fn flat(name: impl Into<String>, value: i32) -> Self {
        Self { name: name.into(), magnitude: Some(Magnitude::Flat(value)) }
    }

    pub fn percent(name: impl Into<String>, value: i32) -> Self {
        Self { name: name.into(), magnitude: Some(Magnitude::Percent(value)) }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.magnitude {
            None                         => write!(f, "{}", self.name),
            Some(Magnitude::Flat(v))     => write!(f, "{} {v:+}", self.name),
            Some(Magnitude::Percent(v))  => write!(f, "{} {v:+}%", self.name),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Province {
    pub id:          ProvinceId,
    pub name:        String,
    pub owner:       CountryName,
    pub development: f64,
    pub pops:        BTreeMap<PopClass, u64>,
    pub modifiers:   Vec<Modifier>,
    pub buildings:   Vec<String>,
}

impl Province {
    /// A fresh uninhabited province with the base population of 1000
    /// peasants and development 1.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let mut pops = BTreeMap::new();
        pops.insert(PopClass::Peasants, 1000);
        Self {
            name: id.clone(),
            id,
            owner: UNOWNED.to_string(),
            development: 1.0,
            pops,
            modifiers: Vec::new(),
            buildings: Vec::new(),
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    pub fn with_development(mut self, development: f64) -> Self {
        self.development = development;
        self
    }

    pub fn with_pop(mut self, class: PopClass, count: u64) -> Self {
        self.pops.insert(class, count);
        self
    }

    pub fn is_unowned(&self) -> bool {
        self.owner == UNOWNED
    }

    pub fn pop(&self, class: PopClass) -> u64 {
        self.pops.get(&class).copied().unwrap_or(0)
    }

    pub fn set_pop(&mut self, class: PopClass, count: u64) {
        self.pops.insert(class, count);
    }

    pub fn add_modifier(&mut self, modifier: Modifier) {
        self.modifiers.push(modifier);
    }

    pub fn has_modifier(&self, name: &str) -> bool {
        self.modifiers.iter().any(|m| m.name == name)
    }

    pub fn add_building(&mut self, building: impl Into<String>) {
        let building = building.into();
        if !self.buildings.contains(&building) {
            self.buildings.push(building);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Country {
    pub name:      CountryName,
    pub treasury:  f64,
    pub stability: f64,
    pub provinces: Vec<ProvinceId>,
}

impl Country {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            treasury: 100.0,
            stability: 0.0,
            provinces: Vec::new(),
        }
    }

    pub fn add_province(&mut self, province_id: &str) {
        if !self.provinces.iter().any(|p| p == province_id) {
            self.provinces.push(province_id.to_string());
        }
    }
}

/// The narrow interface the core uses to reach provinces and countries.
pub trait WorldMap {
    fn province(&self, id: &str) -> Option<&Province>;
    fn province_mut(&mut self, id: &str) -> Option<&mut Province>;
    fn country(&self, name: &str) -> Option<&Country>;
    fn country_mut(&mut self, name: &str) -> Option<&mut Country>;
    /// All province ids in a stable order.
    fn province_ids(&self) -> Vec<ProvinceId>;
}

/// In-memory world map. Ordered maps keep every listing deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct World {
    provinces: BTreeMap<ProvinceId, Province>,
    countries: BTreeMap<CountryName, Country>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a province, registering it with its owner if that country
    /// already exists.
    pub fn insert_province(&mut self, province: Province) {
        if let Some(country) = self.countries.get_mut(&province.owner) {
            country.add_province(&province.id);
        }
        self.provinces.insert(province.id.clone(), province);
    }

    pub fn insert_country(&mut self, mut country: Country) {
        for province in self.provinces.values() {
            if province.owner == country.name {
                country.add_province(&province.id);
            }
        }
        self.countries.insert(country.name.clone(), country);
    }

    pub fn remove_province(&mut self, id: &str) -> Option<Province> {
        let removed = self.provinces.remove(id)?;
        if let Some(country) = self.countries.get_mut(&removed.owner) {
            country.provinces.retain(|p| p != id);
        }
        Some(removed)
    }

    pub fn remove_country(&mut self, name: &str) -> Option<Country> {
        self.countries.remove(name)
    }

    pub fn provinces(&self) -> impl Iterator<Item = &Province> {
        self.provinces.values()
    }

    pub fn countries(&self) -> impl Iterator<Item = &Country> {
        self.countries.values()
    }
}

impl WorldMap for World {
    fn province(&self, id: &str) -> Option<&Province> {
        self.provinces.get(id)
    }

    fn province_mut(&mut self, id: &str) -> Option<&mut Province> {
        self.provinces.get_mut(id)
    }

    fn country(&self, name: &str) -> Option<&Country> {
        self.countries.get(name)
    }

    fn country_mut(&mut self, name: &str) -> Option<&mut Country> {
        self.countries.get_mut(name)
    }

    fn province_ids(&self) -> Vec<ProvinceId> {
        self.provinces.keys().cloned().collect()
    }
}
