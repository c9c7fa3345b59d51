//! THE MOST IMPORTANT TEST IN THE PROJECT.
//!
//! Two engines, same seed, same commands.
//! They must produce byte-identical event logs.
//! Any divergence is a blocker. Do not merge until fixed.

mod common;

use roma_core::{
    engine::SimEngine,
    project_subsystem::{BuildingKind, DevelopmentKind},
    world::{Country, PopClass, Province, World},
};

fn frontier_world() -> World {
    let mut world = World::new();
    for country in ["Rome", "Carthage", "Macedon"] {
        world.insert_country(Country::new(country));
    }
    world.insert_province(
        Province::new("latium")
            .with_owner("Rome")
            .with_development(6.0)
            .with_pop(PopClass::Craftsmen, 500),
    );
    world.insert_province(Province::new("africa").with_owner("Carthage").with_development(4.0));
    for id in ["baleares", "corsica", "creta", "cyprus", "sardinia", "sicilia"] {
        world.insert_province(Province::new(id));
    }
    world
}

fn build_engine(seed: u64) -> SimEngine {
    common::init_logging();
    let run_id = format!("det-test-{seed}");
    let mut engine = SimEngine::build_test(run_id, seed, frontier_world()).expect("engine");

    let missions = [
        ("Rome", "sardinia", 1000),
        ("Rome", "corsica", 250),
        ("Carthage", "sicilia", 600),
        ("Carthage", "baleares", 100),
        ("Macedon", "creta", 800),
        ("Macedon", "cyprus", 450),
    ];
    for (country, province, colonists) in missions {
        engine.start_colonization(country, province, colonists).expect("colonize");
    }
    engine.start_development_project("africa", DevelopmentKind::Agriculture, 40).expect("develop");
    engine.start_building_project("latium", BuildingKind::Barracks, 60).expect("build");
    engine.start_research("Macedon", "Military_1").expect("research");
    engine
}

fn collect_event_log(engine: &SimEngine, run_id: &str) -> Vec<String> {
    (0..=engine.clock.current_tick)
        .flat_map(|tick| {
            engine.store_events_for_tick(run_id, tick)
                .expect("read events")
                .into_iter()
                .map(|e| e.payload)
        })
        .collect()
}

#[test]
fn same_seed_produces_identical_event_logs() {
    const SEED: u64 = 0xDEAD_BEEF_CAFE_1234;
    const TICKS: u64 = 120;

    let mut engine_a = build_engine(SEED);
    let mut engine_b = build_engine(SEED);

    engine_a.run_ticks(TICKS).expect("engine_a run");
    engine_b.run_ticks(TICKS).expect("engine_b run");

    let log_a = collect_event_log(&engine_a, &format!("det-test-{SEED}"));
    let log_b = collect_event_log(&engine_b, &format!("det-test-{SEED}"));

    assert_eq!(
        log_a.len(), log_b.len(),
        "Event log lengths differ: {} vs {}",
        log_a.len(), log_b.len()
    );

    for (i, (a, b)) in log_a.iter().zip(log_b.iter()).enumerate() {
        assert_eq!(
            a, b,
            "Event log diverged at entry {i}:\n  A: {a}\n  B: {b}"
        );
    }

    let snapshot_a = serde_json::to_string(&engine_a.world).expect("world a");
    let snapshot_b = serde_json::to_string(&engine_b.world).expect("world b");
    assert_eq!(snapshot_a, snapshot_b, "world maps diverged");
}

#[test]
fn different_seeds_produce_different_logs() {
    let mut engine_a = build_engine(42);
    let mut engine_b = build_engine(99);

    engine_a.run_ticks(60).expect("run a");
    engine_b.run_ticks(60).expect("run b");

    // Colonization draws are the seeded part of the run; compare just those.
    let drawn = |engine: &SimEngine, run_id: &str| -> Vec<String> {
        collect_event_log(engine, run_id)
            .into_iter()
            .filter(|p| p.contains("colonization_event_occurred"))
            .collect()
    };
    let events_a = drawn(&engine_a, "det-test-42");
    let events_b = drawn(&engine_b, "det-test-99");

    assert!(!events_a.is_empty());
    assert_ne!(events_a, events_b, "Different seeds produced identical draws; seed is not being used");
}
