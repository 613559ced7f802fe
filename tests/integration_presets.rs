//! Preset and command-line integration tests.

mod common;

use std::path::Path;
use std::process::Command;

use common::engine;
use microgrid_sim::config::ScenarioConfig;
use microgrid_sim::sim::kpi::RunSummary;

#[test]
fn every_preset_runs() {
    for name in ScenarioConfig::PRESETS {
        let mut cfg = ScenarioConfig::from_preset(name).unwrap_or_else(|e| panic!("{e}"));
        cfg.simulation.ticks = 48;
        let outcome = engine(&cfg).run();
        assert_eq!(outcome.reports.len(), 48, "preset {name}");
    }
}

#[test]
fn bundled_scenario_files_are_valid() {
    for file in ["baseline.toml", "islanded.toml", "evening_peak.toml"] {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file);
        let cfg = ScenarioConfig::from_toml_file(&path).unwrap_or_else(|e| panic!("{file}: {e}"));
        let errors = cfg.validate();
        assert!(errors.is_empty(), "{file}: {errors:?}");
    }
}

#[test]
fn baseline_file_matches_baseline_preset() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios/baseline.toml");
    let file = ScenarioConfig::from_toml_file(&path).unwrap_or_else(|e| panic!("{e}"));
    let a = engine(&file).run().reports;
    let b = engine(&ScenarioConfig::baseline()).run().reports;
    assert_eq!(a, b);
}

#[test]
fn trading_street_trades_between_neighbors() {
    let mut cfg = ScenarioConfig::trading_street();
    cfg.simulation.ticks = 168;
    let outcome = engine(&cfg).run();
    let summary = RunSummary::from_reports(&outcome.reports);
    assert!(summary.total_generation > 0.0);
    for r in &outcome.reports {
        let bought = r.total(|a| a.bought_from_neighbors);
        let sold = r.total(|a| a.sold_to_neighbors);
        assert!((bought - sold).abs() < 1e-6);
        // Consumers have no storage, so they never sell.
        assert!(r.agents[6..].iter().all(|a| a.sold_to_neighbors == 0.0));
    }
}

#[test]
fn cli_prints_summary_for_preset() {
    let output = Command::new(env!("CARGO_BIN_EXE_microgrid-sim"))
        .args(["--preset", "trading_street", "--ticks", "24", "--quiet"])
        .output()
        .expect("microgrid-sim process should run");
    assert!(
        output.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--- Run Summary ---"));
    let ticks = stdout
        .lines()
        .find(|l| l.starts_with("Ticks simulated:"))
        .and_then(|l| l.split_once(':'))
        .map(|(_, v)| v.trim().to_string());
    assert_eq!(ticks.as_deref(), Some("24"));
}

#[test]
fn cli_rejects_invalid_scenario() {
    let dir = std::env::temp_dir().join(format!("microgrid-sim-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("bad.toml");
    std::fs::write(&path, "[simulation]\nperiod = 0\n").expect("write scenario");

    let output = Command::new(env!("CARGO_BIN_EXE_microgrid-sim"))
        .arg("--scenario")
        .arg(&path)
        .output()
        .expect("microgrid-sim process should run");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("simulation.period"));
}

#[test]
fn cli_writes_csv() {
    let dir = std::env::temp_dir().join(format!("microgrid-sim-csv-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("agents.csv");

    let status = Command::new(env!("CARGO_BIN_EXE_microgrid-sim"))
        .args(["--ticks", "5", "--quiet", "--csv-out"])
        .arg(&path)
        .output()
        .expect("microgrid-sim process should run")
        .status;
    assert!(status.success());

    let csv = std::fs::read_to_string(&path).expect("csv written");
    // Header plus ten agents for five ticks.
    assert_eq!(csv.lines().count(), 51);
}

#[test]
fn cli_log_level_controls_stderr() {
    let run = |level: &str| {
        Command::new(env!("CARGO_BIN_EXE_microgrid-sim"))
            .args(["--ticks", "2", "--quiet", "--log-level", level])
            .output()
            .expect("microgrid-sim process should run")
    };

    let info = run("info");
    assert!(info.status.success());
    assert!(String::from_utf8_lossy(&info.stderr).contains("scenario built"));

    let quiet = run("off");
    assert!(quiet.status.success());
    assert!(quiet.stderr.is_empty());

    let bogus = run("verbose");
    assert!(!bogus.status.success());
    assert!(String::from_utf8_lossy(&bogus.stderr).contains("unknown log level"));
}
