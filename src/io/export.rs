//! CSV export for per-agent tick records.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::error::SimError;
use crate::sim::types::{AgentTickRecord, TickReport};

/// Column header for agent telemetry export.
const HEADER: &str = "tick,agent,group,connected,load,generation,satisfied_load,\
                      spent_generation,stored_power,bought_from_grid,sold_to_grid,\
                      bought_from_neighbors,sold_to_neighbors,neighborhood_request,\
                      added_suspension,removed_suspension,forced_suspension,\
                      suspended_load,dumped_power,profit";

/// Exports one row per agent per tick to a CSV file at the given path.
///
/// Produces deterministic output for identical inputs.
///
/// # Arguments
///
/// * `reports` - Tick reports in order
/// * `path` - Output file path
///
/// # Errors
///
/// Returns a `SimError` if file creation or writing fails.
pub fn export_csv(reports: &[TickReport], path: &Path) -> Result<(), SimError> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(reports, buf)
}

/// Writes agent records as CSV to any writer.
///
/// # Errors
///
/// Returns a `SimError` if writing fails.
pub fn write_csv(reports: &[TickReport], writer: impl Write) -> Result<(), SimError> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for r in reports.iter().flat_map(|r| &r.agents) {
        wtr.write_record(row(r))?;
    }

    wtr.flush()?;
    Ok(())
}

fn row(r: &AgentTickRecord) -> [String; 20] {
    [
        r.tick.to_string(),
        r.agent.to_string(),
        r.group.clone(),
        r.connected.to_string(),
        format!("{:.6}", r.load),
        format!("{:.6}", r.generation),
        format!("{:.6}", r.satisfied_load),
        format!("{:.6}", r.spent_generation),
        format!("{:.6}", r.stored_power),
        format!("{:.6}", r.bought_from_grid),
        format!("{:.6}", r.sold_to_grid),
        format!("{:.6}", r.bought_from_neighbors),
        format!("{:.6}", r.sold_to_neighbors),
        format!("{:.6}", r.neighborhood_request),
        format!("{:.6}", r.added_suspension),
        format!("{:.6}", r.removed_suspension),
        format!("{:.6}", r.forced_suspension),
        format!("{:.6}", r.suspended_load),
        format!("{:.6}", r.dumped_power),
        format!("{:.6}", r.profit),
    ]
}
