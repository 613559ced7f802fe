pub mod context;
pub mod engine;
pub mod kpi;
pub mod types;
