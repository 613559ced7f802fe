//! Integration tests for grid failures and blackout areas.

mod common;

use common::{EPS, assert_balanced, engine, flat_group, flat_scenario};
use microgrid_sim::config::{NetworkConfig, ScenarioConfig};
use microgrid_sim::models::{RadiusDistribution, ReliabilitySpec};
use microgrid_sim::sim::kpi::RunSummary;
use microgrid_sim::sim::types::StopReason;

/// Six agents on a ring with a grid that fails at once and never recovers.
fn failing_ring() -> ScenarioConfig {
    let mut cfg = flat_scenario(4, 12, vec![flat_group("homes", 6, 2.0, 0.0)]);
    cfg.network = NetworkConfig::Ring { ring_k: 1 };
    cfg.policy.simulate_reliability = true;
    cfg.grid.blackout_radius = RadiusDistribution::Constant { value: 1 };
    cfg.grid.reliability = ReliabilitySpec {
        failure_probability: 1.0,
        recovery_probability: 0.0,
    };
    cfg
}

#[test]
fn blackout_is_contained_to_the_ball() {
    let mut engine = engine(&failing_ring());
    let first = engine.step();
    let Some(first) = first else {
        panic!("first tick should run");
    };
    assert!(first.blackout_started);
    assert_eq!(first.blackout_size, 3);
    assert!(!first.grid_operational);

    let area = engine.grid().blackout_area().to_vec();
    let center = area
        .iter()
        .copied()
        .find(|&id| area.iter().all(|&o| o == id || engine.network().are_adjacent(id, o)));
    assert!(center.is_some(), "blackout area should be a radius-one ball: {area:?}");
}

#[test]
fn disconnected_agents_are_forcefully_suspended() {
    let mut engine = engine(&failing_ring());
    while let Some(r) = engine.step() {
        assert_balanced(&engine);
        assert_eq!(r.blackout_size, 3);
        for a in &r.agents {
            if a.connected {
                assert!((a.bought_from_grid - 2.0).abs() < EPS);
                assert_eq!(a.forced_suspension, 0.0);
            } else {
                assert_eq!(a.bought_from_grid, 0.0);
                assert!((a.forced_suspension - 2.0).abs() < EPS);
            }
        }
    }
}

#[test]
fn blackout_is_started_once() {
    let outcome = engine(&failing_ring()).run();
    let summary = RunSummary::from_reports(&outcome.reports);
    assert_eq!(summary.blackouts_started, 1);
    assert_eq!(summary.blackout_ticks, 12);
    assert_eq!(summary.forced_suspension_count, 3 * 12);
}

#[test]
fn pause_on_blackout_stops_the_run() {
    let mut cfg = failing_ring();
    cfg.policy.pause_on_blackout = true;
    let mut engine = engine(&cfg);
    let outcome = engine.run();
    assert_eq!(outcome.stop_reason, StopReason::BlackoutPause);
    assert_eq!(outcome.reports.len(), 1);
    assert_eq!(engine.current_tick(), 1);
}

#[test]
fn reliability_is_ignored_unless_simulated() {
    let mut cfg = failing_ring();
    cfg.policy.simulate_reliability = false;
    let outcome = engine(&cfg).run();
    assert!(outcome.reports.iter().all(|r| r.grid_operational && r.blackout_size == 0));
}

#[test]
fn recovering_grid_reconnects_everyone() {
    let mut cfg = failing_ring();
    cfg.grid.reliability.recovery_probability = 1.0;
    let mut engine = engine(&cfg);
    let _ = engine.step();
    let second = engine.step();
    assert_eq!(second.map(|r| r.blackout_size), Some(0));
    assert!(engine.agents().iter().all(|a| a.is_connected_to_grid()));
}
