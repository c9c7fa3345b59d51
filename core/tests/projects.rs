//! Development and building project tests.

mod common;

use common::quiet_engine;
use roma_core::{
    error::{RejectReason, SimError},
    project_subsystem::{BuildingKind, DevelopmentKind, ProjectKind},
    task::TimedTask,
    world::{Country, PopClass, Province, World, WorldMap},
};

/// Rome owns `latium` with development 0, 1000 peasants and 100 craftsmen.
fn province_world(development: f64) -> World {
    let mut world = World::new();
    world.insert_country(Country::new("Rome"));
    world.insert_province(
        Province::new("latium")
            .with_owner("Rome")
            .with_development(development)
            .with_pop(PopClass::Craftsmen, 100),
    );
    world
}

/// Trade at development 0 needs 600 work. One worker contributes 10 per
/// day, so the project finishes on day 60.
#[test]
fn trade_development_with_one_worker_takes_sixty_days() {
    let mut engine = quiet_engine("dev-one-worker", province_world(0.0));
    let id = engine
        .start_development_project("latium", DevelopmentKind::Trade, 1)
        .unwrap();
    assert_eq!(engine.development.project(&id).unwrap().total_work(), 600);
    assert_eq!(engine.world.province("latium").unwrap().pop(PopClass::Peasants), 999);

    engine.run_ticks(59).unwrap();
    let project = engine.development.project(&id).expect("still running on day 59");
    assert_eq!(project.work.progress, 590);

    engine.run_ticks(1).unwrap();
    assert!(engine.development.project(&id).is_none());

    let latium = engine.world.province("latium").unwrap();
    assert!((latium.development - 1.0).abs() < 1e-9);
    assert!(latium.has_modifier("Trade Development"));
    assert_eq!(latium.pop(PopClass::Peasants), 1000, "workers return on completion");
}

/// Ten workers contribute 100 per day against the same 600 work.
#[test]
fn trade_development_with_ten_workers_takes_six_days() {
    let mut engine = quiet_engine("dev-ten-workers", province_world(0.0));
    let id = engine
        .start_development_project("latium", DevelopmentKind::Trade, 10)
        .unwrap();

    engine.run_ticks(5).unwrap();
    assert!(engine.development.project(&id).is_some());
    engine.run_ticks(1).unwrap();
    assert!(engine.development.project(&id).is_none());
    assert_eq!(engine.store.event_count("dev-ten-workers", "project_completed").unwrap(), 1);
}

#[test]
fn total_work_scales_with_development() {
    assert_eq!(DevelopmentKind::Infrastructure.total_work(0.0), 1000);
    assert_eq!(DevelopmentKind::Infrastructure.total_work(10.0), 2000);
    assert_eq!(BuildingKind::Walls.total_work(0.0), 1500);
    assert_eq!(BuildingKind::Walls.total_work(20.0), 3000);
}

/// City Walls at development 1: 1500 * 1.05 = 1575 work, 20 craftsmen at
/// 15 per day reach it on day 6.
#[test]
fn walls_add_building_and_defense_modifier() {
    let run_id = "bld-walls";
    let mut engine = quiet_engine(run_id, province_world(1.0));
    let id = engine
        .start_building_project("latium", BuildingKind::Walls, 20)
        .unwrap();
    assert_eq!(engine.building.project(&id).unwrap().total_work(), 1575);
    assert_eq!(engine.world.province("latium").unwrap().pop(PopClass::Craftsmen), 80);

    engine.run_ticks(5).unwrap();
    assert!(engine.building.project(&id).is_some());
    engine.run_ticks(1).unwrap();
    assert!(engine.building.project(&id).is_none());

    let latium = engine.world.province("latium").unwrap();
    assert_eq!(latium.buildings, vec!["City Walls".to_string()]);
    let defense = latium.modifiers.iter().find(|m| m.name == "Defense").expect("defense modifier");
    assert_eq!(defense.to_string(), "Defense +20%");
    assert_eq!(latium.pop(PopClass::Craftsmen), 100);
}

#[test]
fn building_twice_keeps_one_building_entry() {
    let mut engine = quiet_engine("bld-twice", province_world(0.0));
    for _ in 0..2 {
        engine.start_building_project("latium", BuildingKind::Market, 100).unwrap();
        engine.run_ticks(1).unwrap();
    }
    let latium = engine.world.province("latium").unwrap();
    assert_eq!(latium.buildings, vec!["Market".to_string()]);
    assert_eq!(latium.modifiers.iter().filter(|m| m.name == "Tax Income").count(), 2);
}

#[test]
fn insufficient_population_is_rejected_without_change() {
    let mut engine = quiet_engine("dev-pop", province_world(0.0));
    let result = engine.start_development_project("latium", DevelopmentKind::Agriculture, 2000);
    match result {
        Err(SimError::Rejected(RejectReason::InsufficientPopulation { available, requested, .. })) => {
            assert_eq!(available, 1000);
            assert_eq!(requested, 2000);
        }
        other => panic!("expected insufficient population, got {other:?}"),
    }
    assert_eq!(engine.world.province("latium").unwrap().pop(PopClass::Peasants), 1000);
    assert!(engine.development.active_projects().is_empty());
}

#[test]
fn zero_workers_and_unknown_province_are_rejected() {
    let mut engine = quiet_engine("dev-invalid", province_world(0.0));
    assert!(matches!(
        engine.start_development_project("latium", DevelopmentKind::Trade, 0),
        Err(SimError::Rejected(RejectReason::NoWorkers))
    ));
    assert!(matches!(
        engine.start_building_project("numidia", BuildingKind::Temple, 10),
        Err(SimError::Rejected(RejectReason::UnknownProvince(_)))
    ));
}

/// One project per family per province, but families do not block each other.
#[test]
fn one_project_per_family_per_province() {
    let mut engine = quiet_engine("dev-dup", province_world(0.0));
    engine.start_development_project("latium", DevelopmentKind::Trade, 10).unwrap();
    assert!(matches!(
        engine.start_development_project("latium", DevelopmentKind::Military, 10),
        Err(SimError::Rejected(RejectReason::TaskAlreadyActive { family: "development", .. }))
    ));
    engine.start_building_project("latium", BuildingKind::Forum, 10).unwrap();
    assert_eq!(engine.world.province("latium").unwrap().pop(PopClass::Peasants), 990);
    assert_eq!(engine.development.projects_in("latium").len(), 1);
    assert_eq!(engine.building.projects_in("latium")[0].kind, BuildingKind::Forum);
}

#[test]
fn progress_fraction_is_monotone() {
    let mut engine = quiet_engine("dev-monotone", province_world(0.0));
    let id = engine
        .start_development_project("latium", DevelopmentKind::Infrastructure, 3)
        .unwrap();

    let mut last = 0.0;
    while let Some(project) = engine.development.project(&id) {
        let fraction = project.progress_fraction();
        assert!(fraction >= last, "progress went backwards: {last} -> {fraction}");
        assert!(fraction < 1.0, "a live project cannot report full progress");
        last = fraction;
        engine.run_ticks(1).unwrap();
    }
    assert!(last > 0.9);
}

/// A project whose province vanished completes without effects.
#[test]
fn vanished_province_skips_project_effects() {
    let run_id = "dev-vanished";
    let mut engine = quiet_engine(run_id, province_world(0.0));
    engine.start_development_project("latium", DevelopmentKind::Trade, 100).unwrap();
    engine.world.remove_province("latium");

    engine.run_ticks(1).unwrap();
    assert!(engine.development.active_projects().is_empty());
    assert_eq!(engine.store.event_count(run_id, "task_effects_skipped").unwrap(), 1);
    assert_eq!(engine.store.event_count(run_id, "project_completed").unwrap(), 0);
}
