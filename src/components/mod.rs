//! Simulation entities: agents, the grid, storage and the neighborhood network.

/// Household agents and their decision procedure.
pub mod agent;
pub mod grid;
/// Neighborhood topology and trade edges.
pub mod network;
pub mod storage;

// Re-export the main types for convenience
pub use agent::{Agent, AgentParams, DecisionCache, Neighbor, Peers, Phase};
pub use grid::{BlackoutEvent, Grid};
pub use network::{AgentId, Network};
pub use storage::Storage;
