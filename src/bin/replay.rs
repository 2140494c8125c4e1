// Standalone replay tool for analyzing agent decision logs
//
// Usage:
//   cargo run --bin replay -- <log_file> [options]
//
// Options:
//   --verbose              Show per-step output
//   --budget-ms <N>        Planning budget per replayed step (default: 200)
//   --config <path>        Path to Agent.toml (default: Agent.toml)

use std::env;
use std::process;

use snake_agent::config::Config;
use snake_agent::replay::ReplayEngine;

fn print_usage() {
    eprintln!("Snake Agent Replay Tool");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  replay <log_file> [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --verbose               Show per-step output");
    eprintln!("  --budget-ms <N>         Planning budget per replayed step (default: 200)");
    eprintln!("  --config <path>         Path to Agent.toml (default: Agent.toml)");
    eprintln!("  --help                  Show this help message");
    eprintln!();
    eprintln!("EXAMPLES:");
    eprintln!("  # Replay a recorded episode");
    eprintln!("  replay snake_agent_debug.jsonl");
    eprintln!();
    eprintln!("  # Replay with a generous planning budget and per-step detail");
    eprintln!("  replay snake_agent_debug.jsonl --verbose --budget-ms 1000");
}

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.contains(&"--help".to_string()) {
        print_usage();
        process::exit(if args.len() < 2 { 1 } else { 0 });
    }

    let log_file = &args[1];
    let mut verbose = false;
    let mut budget_ms: u64 = 200;
    let mut config_path: Option<String> = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--verbose" => verbose = true,
            "--budget-ms" => {
                i += 1;
                budget_ms = match args.get(i).map(|s| s.parse::<u64>()) {
                    Some(Ok(n)) => n,
                    _ => {
                        eprintln!("Error: --budget-ms requires a number");
                        process::exit(1);
                    }
                };
            }
            "--config" => {
                i += 1;
                match args.get(i) {
                    Some(path) => config_path = Some(path.clone()),
                    None => {
                        eprintln!("Error: --config requires a path");
                        process::exit(1);
                    }
                }
            }
            other => {
                eprintln!("Error: unknown option '{}'", other);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let config = match config_path {
        Some(path) => match Config::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        None => Config::load_or_default(),
    };

    let engine = ReplayEngine::new(config, budget_ms, verbose);

    let (header, records) = match engine.load_log_file(log_file) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let results = engine.replay_all(&header, &records);
    engine.print_report(&results);

    let stats = engine.generate_stats(&results);
    if stats.mismatches > 0 {
        process::exit(2);
    }
}
