//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use roma_core::{
    catalog::{EventCatalog, EventTemplate},
    config::SimConfig,
    engine::SimEngine,
    store::SimStore,
    world::{Country, Province, World},
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Rome owns `latium`; `sardinia`, `corsica` and `sicilia` are uninhabited.
pub fn small_world() -> World {
    let mut world = World::new();
    world.insert_country(Country::new("Rome"));
    world.insert_country(Country::new("Carthage"));
    world.insert_province(Province::new("latium").with_owner("Rome"));
    for id in ["sardinia", "corsica", "sicilia"] {
        world.insert_province(Province::new(id));
    }
    world
}

/// Test config whose events carry no effects and never fire in flight,
/// so colonization outcomes are exact.
pub fn quiet_config() -> SimConfig {
    let mut config = SimConfig::default_test();
    let blank = |name: &str| vec![EventTemplate { name: name.into(), effects: vec![] }];
    config.event_catalog = EventCatalog {
        positive: blank("Calm seas"),
        negative: blank("Late supplies"),
        neutral:  blank("Uneventful journey"),
    };
    config.colonization.in_flight_event_chance = 0.0;
    config
}

pub fn engine_with(run_id: &str, seed: u64, config: &SimConfig, world: World) -> SimEngine {
    init_logging();
    let store = SimStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    store.insert_run(run_id, seed, "0.1.0-test").expect("insert run");
    SimEngine::new(run_id.into(), seed, store, config, world)
}

pub fn quiet_engine(run_id: &str, world: World) -> SimEngine {
    engine_with(run_id, 42, &quiet_config(), world)
}
