//! Stderr logging for the command-line binary.

use tracing_subscriber::filter::LevelFilter;

/// Parses a `--log-level` value: `off`, `error`, `warn`, `info`, `debug` or
/// `trace` (case-insensitive).
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    name.parse::<LevelFilter>().ok()
}

/// Installs a `fmt` subscriber writing to stderr as the global default.
///
/// Has no effect if a global subscriber is already set.
pub fn init_logging(max_level: LevelFilter) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_writer(std::io::stderr)
        .with_thread_ids(false)
        .try_init();
}
