//! Engine, config and persistence tests.

mod common;

use common::{quiet_engine, small_world};
use roma_core::{
    catalog::EventCatalog,
    config::SimConfig,
    engine::SimEngine,
    snapshot::SNAPSHOT_INTERVAL,
    world::WorldMap,
};

/// The shipped data directory matches the built-in defaults.
#[test]
fn data_directory_loads() {
    let data_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../data");
    let config = SimConfig::load(data_dir).expect("load data/");

    assert_eq!(config.event_catalog, EventCatalog::standard());
    assert_eq!(config.event_catalog.positive.len(), 8);
    assert_eq!(config.event_catalog.negative.len(), 8);
    assert_eq!(config.event_catalog.neutral.len(), 5);

    let c = &config.colonization;
    assert_eq!((c.min_colonists, c.max_colonists), (100, 1000));
    assert_eq!(c.max_duration_days(1000), 40);
    assert!(config.technologies.iter().any(|t| t.name == "Naval_2" && t.prerequisites == ["Naval_1"]));
}

#[test]
fn missing_data_directory_is_an_error() {
    let err = SimConfig::load("/nonexistent/roma-data").unwrap_err();
    assert!(err.to_string().contains("colonization.json"));
}

#[test]
fn built_in_config_is_valid() {
    SimConfig::default_test().validate().expect("default config validates");
}

#[test]
fn unresearchable_technologies_are_rejected() {
    let mut config = SimConfig::default_test();
    config.technologies[0].prerequisites.push("Sorcery_1".into());
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("Sorcery_1"), "{err}");

    let mut config = SimConfig::default_test();
    config.technologies[0].level = 0;
    assert!(config.validate().unwrap_err().to_string().contains("level 0"));

    let mut config = SimConfig::default_test();
    config.technologies[0].research_time = Some(0);
    assert!(config.validate().unwrap_err().to_string().contains("0 days"));

    // A category chain that skips a level leaves the next level unreachable.
    let mut config = SimConfig::default_test();
    config.technologies.retain(|t| t.name != "Trade_2");
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("Trade_3 requires unknown technology Trade_2"), "{err}");
}

#[test]
fn clock_tracks_calendar() {
    let mut engine = SimEngine::build_test("engine-calendar".into(), 1, small_world()).unwrap();
    engine.run_ticks(365).unwrap();
    assert_eq!(engine.clock.current_tick, 365);
    assert_eq!(engine.clock.date().to_string(), "0118-01-01");
    assert!(engine.clock.paused, "run_ticks leaves the clock paused");
}

/// Each tick brackets subsystem output with start and completion markers.
#[test]
fn tick_emits_bracketing_events() {
    let mut engine = quiet_engine("engine-bracket", small_world());
    engine.start_research("Rome", "Trade_1").unwrap();

    let events = engine.advance_all_registries().unwrap();
    assert_eq!(events.first().map(|e| e.type_name()), Some("tick_started"));
    assert_eq!(events.last().map(|e| e.type_name()), Some("tick_completed"));
    assert_eq!(engine.clock.current_tick, 1);
    assert_eq!(engine.store.event_count("engine-bracket", "run_initialized").unwrap(), 1);

    engine.advance_all_registries().unwrap();
    assert_eq!(engine.store.event_count("engine-bracket", "run_initialized").unwrap(), 1);
}

#[test]
fn snapshot_is_stored_every_interval() {
    let run_id = "engine-snapshot";
    let mut engine = quiet_engine(run_id, small_world());
    engine.start_colonization("Rome", "sicilia", 900).unwrap();

    engine.run_ticks(SNAPSHOT_INTERVAL - 1).unwrap();
    assert!(engine.store.latest_snapshot_before(run_id, SNAPSHOT_INTERVAL).unwrap().is_none());

    engine.run_ticks(1).unwrap();
    let (tick, json) = engine
        .store
        .latest_snapshot_before(run_id, SNAPSHOT_INTERVAL)
        .unwrap()
        .expect("snapshot at interval");
    assert_eq!(tick, SNAPSHOT_INTERVAL);

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["tick"], SNAPSHOT_INTERVAL);
    assert_eq!(value["colonization"][0]["province_id"], "sicilia");
    assert_eq!(value["colonization"][0]["duration"]["elapsed_days"], 30);
}

#[test]
fn removing_a_country_unowns_nothing_else() {
    let mut engine = quiet_engine("engine-remove", small_world());
    engine.world.remove_country("Carthage");
    assert!(engine.world.country("Carthage").is_none());
    assert_eq!(engine.world.province("latium").unwrap().owner, "Rome");
}
