//! Neighborhood microgrid simulator.
//!
//! A population of prosumer agents with load, generation and storage trades
//! power with a utility grid and with its network neighbors, one phased tick
//! at a time.

/// Agents, grid, network and storage.
pub mod components;
pub mod config;
pub mod error;
pub mod io;
pub mod logging;
/// Stochastic time-series models and reliability chains.
pub mod models;
pub mod scenario;
/// Simulation engine, context and reports.
pub mod sim;
/// Windowed statistics and forecast areas.
pub mod stats;
