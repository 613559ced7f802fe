//! Microgrid simulator entry point: CLI wiring and config-driven engine construction.

use std::path::Path;
use std::process;

use microgrid_sim::config::ScenarioConfig;
use microgrid_sim::io::export::export_csv;
use microgrid_sim::logging::{init_logging, parse_level};
use microgrid_sim::scenario::build_engine;
use microgrid_sim::sim::kpi::RunSummary;
use microgrid_sim::sim::types::StopReason;

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    ticks_override: Option<u64>,
    csv_out: Option<String>,
    log_level: String,
    quiet: bool,
}

fn print_help() {
    eprintln!("microgrid-sim: neighborhood microgrid simulator");
    eprintln!();
    eprintln!("Usage: microgrid-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!(
        "  --preset <name>          Use a built-in preset ({})",
        ScenarioConfig::PRESETS.join(", ")
    );
    eprintln!("  --seed <u64>             Override random seed");
    eprintln!("  --ticks <u64>            Override number of ticks");
    eprintln!("  --csv-out <path>         Export per-agent tick records to CSV");
    eprintln!("  --log-level <level>      off, error, warn, info, debug or trace (default: warn)");
    eprintln!("  --quiet                  Print only the run summary");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
}

/// Returns the value following flag `args[*i]`, or exits with an error.
fn flag_value(args: &[String], i: &mut usize, what: &str) -> String {
    *i += 1;
    if *i >= args.len() {
        eprintln!("error: {} requires {what}", args[*i - 1]);
        process::exit(1);
    }
    args[*i].clone()
}

fn parse_u64(flag: &str, value: &str) -> u64 {
    if let Ok(v) = value.parse::<u64>() {
        v
    } else {
        eprintln!("error: {flag} value \"{value}\" is not a valid u64");
        process::exit(1);
    }
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        seed_override: None,
        ticks_override: None,
        csv_out: None,
        log_level: "warn".to_string(),
        quiet: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => cli.scenario_path = Some(flag_value(&args, &mut i, "a path argument")),
            "--preset" => cli.preset = Some(flag_value(&args, &mut i, "a name argument")),
            "--seed" => {
                let v = flag_value(&args, &mut i, "a u64 argument");
                cli.seed_override = Some(parse_u64("--seed", &v));
            }
            "--ticks" => {
                let v = flag_value(&args, &mut i, "a u64 argument");
                cli.ticks_override = Some(parse_u64("--ticks", &v));
            }
            "--csv-out" => cli.csv_out = Some(flag_value(&args, &mut i, "a path argument")),
            "--log-level" => cli.log_level = flag_value(&args, &mut i, "a level argument"),
            "--quiet" | "-q" => cli.quiet = true,
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn main() {
    let cli = parse_args();

    let Some(level) = parse_level(&cli.log_level) else {
        eprintln!("error: unknown log level \"{}\"", cli.log_level);
        process::exit(1);
    };
    init_logging(level);

    // Load config: --scenario takes priority, then --preset, then baseline default
    let loaded = if let Some(ref path) = cli.scenario_path {
        ScenarioConfig::from_toml_file(Path::new(path))
    } else if let Some(ref name) = cli.preset {
        ScenarioConfig::from_preset(name)
    } else {
        Ok(ScenarioConfig::baseline())
    };
    let mut scenario = match loaded {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    if let Some(seed) = cli.seed_override {
        scenario.simulation.seed = seed;
    }
    if let Some(ticks) = cli.ticks_override {
        scenario.simulation.ticks = ticks;
    }

    let mut engine = match build_engine(&scenario) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let outcome = engine.run();

    if !cli.quiet {
        for r in &outcome.reports {
            println!("{r}");
        }
    }
    if outcome.stop_reason == StopReason::BlackoutPause {
        if let Some(last) = outcome.reports.last() {
            println!("\nPaused at tick {}: blackout started", last.tick);
        }
    }

    println!("\n{}", RunSummary::from_reports(&outcome.reports));

    if let Some(ref path) = cli.csv_out {
        if let Err(e) = export_csv(&outcome.reports, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Agent records written to {path}");
    }
}
