//! Logger initialisation for the binary.

use log::LevelFilter;

/// Map the `-v` count and `--quiet` flag to a log level.
///
/// # Examples
///
/// ```
/// use log::LevelFilter;
/// use meson_release::logging::level_for;
///
/// assert_eq!(level_for(0, false), LevelFilter::Warn);
/// assert_eq!(level_for(2, false), LevelFilter::Debug);
/// assert_eq!(level_for(0, true), LevelFilter::Error);
/// ```
#[must_use]
pub fn level_for(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install `env_logger` at the level chosen on the command line. `RUST_LOG`,
/// when set, takes precedence.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_logging(verbosity: u8, quiet: bool) {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level_for(verbosity, quiet))
        .format_timestamp(None)
        .parse_env(env_logger::Env::default());
    if builder.try_init().is_err() {
        log::debug!("logger already initialised");
    }
}
