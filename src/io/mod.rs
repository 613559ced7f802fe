/// CSV export of per-agent tick records.
pub mod export;
