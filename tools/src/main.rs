//! sim-runner: headless driver for the roma-core simulation.
//!
//! Usage:
//!   sim-runner --seed 12345 --ticks 365 --db run.db
//!   sim-runner --seed 12345 --ipc-mode < commands.jsonl

use anyhow::Result;
use roma_core::{
    command::{CommandOutcome, PlayerCommand},
    engine::SimEngine,
    project_subsystem::{BuildingKind, DevelopmentKind},
    snapshot::SimSnapshot,
    store::SimStore,
    types::ProvinceId,
    world::{Country, PopClass, Province, World},
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcControl {
    GetState,
    Tick {
        count: u64,
    },
    Quit,
}

/// A request line is either a control message or a player command.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum IpcRequest {
    Control(IpcControl),
    Player(PlayerCommand),
}

#[derive(serde::Serialize)]
struct UiState<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<CommandOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    colonizable: Vec<ProvinceId>,
    state: SimSnapshot<'a>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let ticks = parse_arg(&args, "--ticks", 365u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = string_arg(&args, "--db").unwrap_or(":memory:");
    let data_dir = string_arg(&args, "--data-dir").unwrap_or("./data");

    if !ipc_mode {
        println!("Roma sim-runner");
        println!("  seed:      {seed}");
        println!("  ticks:     {ticks}");
        println!("  db:        {db}");
        println!("  data_dir:  {data_dir}");
        println!();
    }

    let store = SimStore::open(db)?;
    store.migrate()?;

    let run_id = format!("run-{seed}-{}", uuid::Uuid::new_v4());
    store.insert_run(&run_id, seed, env!("CARGO_PKG_VERSION"))?;

    let mut engine = SimEngine::build(run_id.clone(), seed, store, data_dir, demo_world())?;
    engine.technology.seed_known_technology("Rome", "Military_1");

    if ipc_mode {
        run_ipc_loop(&mut engine)?;
    } else {
        let refused = issue_demo_orders(&mut engine);
        if refused > 0 {
            println!("  {refused} demo orders refused (see log)");
        }
        engine.run_ticks(ticks)?;
        print_summary(&engine, ticks)?;
    }

    Ok(())
}

/// Rome and Carthage hold one province each; three islands are open.
fn demo_world() -> World {
    let mut world = World::new();
    world.insert_country(Country::new("Rome"));
    world.insert_country(Country::new("Carthage"));
    world.insert_province(
        Province::new("latium")
            .with_owner("Rome")
            .with_development(5.0)
            .with_pop(PopClass::Craftsmen, 400),
    );
    world.insert_province(
        Province::new("africa")
            .with_owner("Carthage")
            .with_development(4.0)
            .with_pop(PopClass::Craftsmen, 300),
    );
    for island in ["sardinia", "corsica", "sicilia"] {
        world.insert_province(Province::new(island));
    }
    world
}

/// Returns how many orders were refused.
fn issue_demo_orders(engine: &mut SimEngine) -> usize {
    let orders = [
        PlayerCommand::Colonize { country: "Rome".into(), province_id: "sardinia".into(), colonists: 500 },
        PlayerCommand::Colonize { country: "Carthage".into(), province_id: "sicilia".into(), colonists: 800 },
        PlayerCommand::Develop { province_id: "latium".into(), kind: DevelopmentKind::Trade, workers: 10 },
        PlayerCommand::Build { province_id: "latium".into(), kind: BuildingKind::Forum, workers: 20 },
        PlayerCommand::Build { province_id: "africa".into(), kind: BuildingKind::Market, workers: 15 },
        PlayerCommand::Research { country: "Rome".into(), technology: "Military_2".into() },
        PlayerCommand::Research { country: "Carthage".into(), technology: "Trade_1".into() },
    ];
    let mut refused = 0;
    for order in &orders {
        if let Err(e) = engine.apply_command(order) {
            log::warn!("Demo order {order:?} refused: {e}");
            refused += 1;
        }
    }
    refused
}

fn run_ipc_loop(engine: &mut SimEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let request: IpcRequest = match serde_json::from_str(&buffer) {
            Ok(r) => r,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        let (outcome, error) = match request {
            IpcRequest::Control(IpcControl::Quit) => break,
            IpcRequest::Control(IpcControl::GetState) => (None, None),
            IpcRequest::Control(IpcControl::Tick { count }) => {
                engine.run_ticks(count)?;
                (None, None)
            }
            IpcRequest::Player(command) => match engine.apply_command(&command) {
                Ok(outcome) => (Some(outcome), None),
                Err(e) => (None, Some(e.to_string())),
            },
        };

        let state = UiState {
            outcome,
            error,
            colonizable: engine.colonizable_provinces(),
            state: engine.snapshot(),
        };
        writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn print_summary(engine: &SimEngine, ticks: u64) -> Result<()> {
    let count = |event_type: &str| engine.store.event_count(&engine.run_id, event_type);

    println!("=== RUN SUMMARY ===");
    println!("  run_id:           {}", engine.run_id);
    println!("  ticks run:        {ticks}");
    println!("  final tick:       {}", engine.clock.current_tick);
    println!("  date:             {}", engine.clock.date());
    println!("  colonies founded: {}", count("colonization_completed")?);
    println!("  colony events:    {}", count("colonization_event_occurred")?);
    println!("  projects done:    {}", count("project_completed")?);
    println!("  research done:    {}", count("research_completed")?);
    println!("  effects skipped:  {}", count("task_effects_skipped")?);

    println!();
    println!("=== REALM ===");
    for country in engine.world.countries() {
        println!(
            "  {:<10} | treasury {:>7.1} | stability {:>4.1} | provinces {:?} | techs {:?}",
            country.name,
            country.treasury,
            country.stability,
            country.provinces,
            engine.technology.known_technologies(&country.name),
        );
    }
    for province in engine.world.provinces() {
        println!(
            "  {:<10} | owner {:<11} | dev {:>5.1} | peasants {:>6} | buildings {:?}",
            province.id,
            province.owner,
            province.development,
            province.pop(PopClass::Peasants),
            province.buildings,
        );
    }
    Ok(())
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
