//! Logging utilities
//!
//! The crate logs through the `log` facade: `debug!` once per octree rebuild,
//! `trace!` per subdivision and collision step, `warn!` when configuration is
//! clamped. These helpers install `env_logger` as the backend.

pub use log::{debug, error, info, trace, warn, LevelFilter};

/// Initialize the logging system from `RUST_LOG`.
///
/// Calling it more than once is harmless; later attempts are ignored.
pub fn init() {
    let _ = env_logger::try_init();
}

/// Initialize with an explicit filter string (same syntax as `RUST_LOG`,
/// e.g. `"spatial_engine::spatial=trace,warn"`).
pub fn init_with_filter(filter: &str) {
    let _ = env_logger::Builder::new().parse_filters(filter).try_init();
}

/// Initialize for unit tests: output is captured by the test harness
pub fn init_for_tests(level: LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .is_test(true)
        .try_init();
}
