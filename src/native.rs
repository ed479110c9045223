//! Native-only setup.

/// Install `env_logger` at `level`. `RUST_LOG`, when set, takes precedence.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(level: log::LevelFilter) {
    let result = env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();
    if result.is_ok() {
        log::debug!("Logging initialised at {}", level);
    }
}
