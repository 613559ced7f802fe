//! Post-hoc run summary computed from tick reports.

use std::fmt;

use super::types::TickReport;

/// Aggregate indicators derived from a complete simulation run.
///
/// Computed post-hoc from `&[TickReport]` so the summary always agrees with
/// the exported rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Number of ticks simulated.
    pub ticks: usize,
    /// Total load across agents and ticks.
    pub total_load: f64,
    /// Total generation across agents and ticks.
    pub total_generation: f64,
    /// Total power delivered by the grid.
    pub grid_energy_sold: f64,
    /// Total power bought back by the grid.
    pub grid_energy_bought: f64,
    /// Total power traded between neighbors.
    pub neighbor_energy_traded: f64,
    /// Total generation thrown away.
    pub energy_dumped: f64,
    /// Total load suspended because nothing could serve it.
    pub forced_suspension: f64,
    /// Number of (agent, tick) pairs with forced suspension.
    pub forced_suspension_count: usize,
    /// Ticks during which a blackout area existed.
    pub blackout_ticks: usize,
    /// Number of blackouts that began.
    pub blackouts_started: usize,
    /// Largest absolute grid demand in a single tick.
    pub peak_demand: f64,
    /// Mean of the per-tick load factor.
    pub mean_load_factor: f64,
    /// Sum of agent profits.
    pub total_profit: f64,
}

impl RunSummary {
    /// Computes the summary from the complete tick report vector.
    ///
    /// # Arguments
    ///
    /// * `reports` - Tick reports in order
    ///
    /// # Returns
    ///
    /// A `RunSummary` with all fields populated; zeros for an empty run.
    pub fn from_reports(reports: &[TickReport]) -> Self {
        let mut summary = Self {
            ticks: reports.len(),
            total_load: 0.0,
            total_generation: 0.0,
            grid_energy_sold: 0.0,
            grid_energy_bought: 0.0,
            neighbor_energy_traded: 0.0,
            energy_dumped: 0.0,
            forced_suspension: 0.0,
            forced_suspension_count: 0,
            blackout_ticks: 0,
            blackouts_started: 0,
            peak_demand: 0.0,
            mean_load_factor: 0.0,
            total_profit: 0.0,
        };
        if reports.is_empty() {
            return summary;
        }

        let mut load_factor_sum = 0.0;
        for r in reports {
            summary.grid_energy_sold += r.grid_sold;
            summary.grid_energy_bought += r.grid_bought;
            summary.peak_demand = summary.peak_demand.max(r.grid_demand.abs());
            load_factor_sum += r.load_factor;

            if r.blackout_size > 0 {
                summary.blackout_ticks += 1;
            }
            if r.blackout_started {
                summary.blackouts_started += 1;
            }

            for a in &r.agents {
                summary.total_load += a.load;
                summary.total_generation += a.generation;
                summary.neighbor_energy_traded += a.bought_from_neighbors;
                summary.energy_dumped += a.dumped_power;
                summary.forced_suspension += a.forced_suspension;
                summary.total_profit += a.profit;
                if a.forced_suspension > 0.0 {
                    summary.forced_suspension_count += 1;
                }
            }
        }
        summary.mean_load_factor = load_factor_sum / reports.len() as f64;
        summary
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Run Summary ---")?;
        writeln!(f, "Ticks simulated:       {}", self.ticks)?;
        writeln!(f, "Total load:            {:.2}", self.total_load)?;
        writeln!(f, "Total generation:      {:.2}", self.total_generation)?;
        writeln!(
            f,
            "Grid energy:           {:.2} sold, {:.2} bought back",
            self.grid_energy_sold, self.grid_energy_bought
        )?;
        writeln!(f, "Neighbor trades:       {:.2}", self.neighbor_energy_traded)?;
        writeln!(f, "Dumped:                {:.2}", self.energy_dumped)?;
        writeln!(
            f,
            "Forced suspension:     {:.2} ({} agent-ticks)",
            self.forced_suspension, self.forced_suspension_count
        )?;
        writeln!(
            f,
            "Blackouts:             {} ({} ticks)",
            self.blackouts_started, self.blackout_ticks
        )?;
        writeln!(f, "Peak demand:           {:.2}", self.peak_demand)?;
        writeln!(f, "Mean load factor:      {:.3}", self.mean_load_factor)?;
        write!(f, "Total profit:          {:.2}", self.total_profit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::types::AgentTickRecord;

    fn agent(load: f64, forced: f64, traded: f64) -> AgentTickRecord {
        AgentTickRecord {
            tick: 0,
            agent: 0,
            group: "homes".into(),
            connected: true,
            load,
            generation: 1.0,
            satisfied_load: load,
            spent_generation: 1.0,
            stored_power: 0.0,
            bought_from_grid: 0.0,
            sold_to_grid: 0.0,
            bought_from_neighbors: traded,
            sold_to_neighbors: 0.0,
            neighborhood_request: 0.0,
            added_suspension: forced,
            removed_suspension: 0.0,
            forced_suspension: forced,
            suspended_load: forced,
            dumped_power: 0.0,
            profit: -1.0,
        }
    }

    fn report(tick: u64, demand: f64, blackout_size: usize, started: bool) -> TickReport {
        TickReport {
            tick,
            base_price: 0.1,
            grid_sold: demand.max(0.0),
            grid_bought: (-demand).max(0.0),
            grid_demand: demand,
            load_factor: 0.5,
            grid_operational: blackout_size == 0,
            blackout_size,
            blackout_started: started,
            agents: vec![agent(2.0, 0.0, 0.0), agent(3.0, 1.0, 0.5)],
        }
    }

    #[test]
    fn test_empty_reports() {
        let s = RunSummary::from_reports(&[]);
        assert_eq!(s.ticks, 0);
        assert_eq!(s.total_load, 0.0);
        assert_eq!(s.mean_load_factor, 0.0);
    }

    #[test]
    fn test_totals_and_counts() {
        let reports = vec![
            report(0, 4.0, 0, false),
            report(1, -6.0, 2, true),
            report(2, 1.0, 2, false),
        ];
        let s = RunSummary::from_reports(&reports);
        assert_eq!(s.ticks, 3);
        assert!((s.total_load - 15.0).abs() < 1e-12);
        assert!((s.total_generation - 6.0).abs() < 1e-12);
        assert!((s.grid_energy_sold - 5.0).abs() < 1e-12);
        assert!((s.grid_energy_bought - 6.0).abs() < 1e-12);
        assert!((s.neighbor_energy_traded - 1.5).abs() < 1e-12);
        assert_eq!(s.forced_suspension_count, 3);
        assert_eq!(s.blackout_ticks, 2);
        assert_eq!(s.blackouts_started, 1);
        assert_eq!(s.peak_demand, 6.0);
        assert!((s.mean_load_factor - 0.5).abs() < 1e-12);
        assert!((s.total_profit + 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_display_does_not_panic() {
        let s = RunSummary::from_reports(&[report(0, 1.0, 0, false)]);
        assert!(format!("{s}").starts_with("--- Run Summary ---"));
    }
}
