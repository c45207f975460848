//! geoscape-headless: run a campaign without a screen layer.
//!
//! Usage:
//!   geoscape-headless run --ruleset rules/sample.json --days 30 --seed 7 --base 5,48
//!   geoscape-headless check --ruleset rules/sample.json

use std::path::PathBuf;
use std::process;

use tracing::info;

use geoscape_core::enums::TimeSpeed;
use geoscape_core::ruleset::Ruleset;
use geoscape_core::types::Position;
use geoscape_sim::{GeoscapeEngine, SimConfig};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "run" => cmd_run(&args[2..]),
        "check" => cmd_check(&args[2..]),
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!(
        "geoscape-headless: run the strategic layer without a screen\n\
         \n\
         Commands:\n\
         \n\
         run       Start a campaign and advance it day by day\n\
         \n\
           --ruleset <path>   Ruleset JSON file\n\
           --days <N>         Days to simulate (default: 30)\n\
           --seed <N>         RNG seed (default: 42)\n\
           --speed <tier>     5s, 1m, 5m, 30m, 1h or 1d (default: 1d)\n\
           --base <lon,lat>   Player base location in degrees (repeatable)\n\
           --snapshot         Print the final snapshot as JSON\n\
         \n\
         check     Load and validate a ruleset\n\
         \n\
           --ruleset <path>   Ruleset JSON file\n"
    );
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_speed(value: &str) -> Option<TimeSpeed> {
    match value {
        "5s" => Some(TimeSpeed::FiveSeconds),
        "1m" => Some(TimeSpeed::OneMinute),
        "5m" => Some(TimeSpeed::FiveMinutes),
        "30m" => Some(TimeSpeed::ThirtyMinutes),
        "1h" => Some(TimeSpeed::OneHour),
        "1d" => Some(TimeSpeed::OneDay),
        _ => None,
    }
}

fn parse_bases(args: &[String]) -> Vec<Position> {
    let mut bases = Vec::new();
    for i in 0..args.len() {
        if args[i] == "--base" && i + 1 < args.len() {
            let parts: Vec<&str> = args[i + 1].split(',').collect();
            if parts.len() == 2 {
                if let (Ok(lon), Ok(lat)) = (parts[0].parse::<f64>(), parts[1].parse::<f64>()) {
                    bases.push(Position::from_degrees(lon, lat));
                }
            }
        }
    }
    bases
}

fn load_ruleset(args: &[String]) -> Ruleset {
    let Some(path) = flag_value(args, "--ruleset").map(PathBuf::from) else {
        eprintln!("Error: --ruleset is required");
        process::exit(1);
    };
    match Ruleset::from_file(&path) {
        Ok(ruleset) => ruleset,
        Err(e) => {
            eprintln!("Error loading ruleset {}: {e}", path.display());
            process::exit(1);
        }
    }
}

fn cmd_check(args: &[String]) {
    let ruleset = load_ruleset(args);
    println!(
        "ok: {} ufos, {} crafts, {} missions, {} regions, {} script commands",
        ruleset.ufos.len(),
        ruleset.crafts.len(),
        ruleset.missions.len(),
        ruleset.regions.len(),
        ruleset.mission_script.len()
    );
}

fn cmd_run(args: &[String]) {
    let ruleset = load_ruleset(args);
    let days: u32 = flag_value(args, "--days")
        .and_then(|v| v.parse().ok())
        .unwrap_or(30);
    let seed: u64 = flag_value(args, "--seed")
        .and_then(|v| v.parse().ok())
        .unwrap_or(42);
    let speed = match flag_value(args, "--speed") {
        None => TimeSpeed::OneDay,
        Some(v) => match parse_speed(v) {
            Some(speed) => speed,
            None => {
                eprintln!("Error: unknown speed '{v}'");
                process::exit(1);
            }
        },
    };

    let mut engine = GeoscapeEngine::new(
        SimConfig {
            seed,
            ..Default::default()
        },
        ruleset,
    );
    for (i, pos) in parse_bases(args).into_iter().enumerate() {
        engine.add_base(&format!("Base {}", i + 1), pos);
    }

    if let Err(e) = engine.start_campaign() {
        eprintln!("Error: {e}");
        process::exit(2);
    }

    let mut notifications = 0u64;
    for day in 1..=days {
        // Keep calling until the whole day has elapsed; notifications and
        // interceptions cut individual calls short.
        let target_day = engine.time().day;
        loop {
            match engine.advance(speed) {
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error on day {day}: {e}");
                    process::exit(2);
                }
            }
            while let Some(queued) = engine.dismiss_notification() {
                notifications += 1;
                info!(
                    target: "geoscape::headless",
                    time = %queued.time,
                    notification = ?queued.notification,
                    "notification.dismissed"
                );
            }
            for session in engine.dogfights().active().to_vec() {
                engine.queue_command(geoscape_core::commands::PlayerCommand::DisengageDogfight {
                    craft: session.craft,
                });
            }
            if engine.time().day != target_day {
                break;
            }
        }
        let snapshot = engine.snapshot();
        info!(
            target: "geoscape::headless",
            day,
            time = %snapshot.time,
            ufos = snapshot.ufos.len(),
            missions = snapshot.missions.len(),
            "day.complete"
        );
    }

    let snapshot = engine.snapshot();
    println!(
        "{} days simulated, {} notifications, {} missions running, {} ufos",
        days,
        notifications,
        snapshot.missions.len(),
        snapshot.ufos.len()
    );
    if args.iter().any(|a| a == "--snapshot") {
        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error serialising snapshot: {e}"),
        }
    }
}
