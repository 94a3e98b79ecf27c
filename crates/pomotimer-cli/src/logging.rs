//! Logging initialization.
//!
//! Log lines go to stderr so JSON printed on stdout stays parseable.

use tracing_subscriber::EnvFilter;

/// Maps a `-v` count to a tracing directive. Zero defers to the config file.
pub fn verbosity_to_directive(verbosity: u8) -> Option<&'static str> {
    match verbosity {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

/// Installs the global subscriber.
///
/// Precedence: `POMOTIMER_LOG`, then `-v`, then `log.level` from the config.
/// Uses `try_init()` so a second call is harmless.
pub fn init_logging(verbosity: u8, config_level: &str) {
    let directive = verbosity_to_directive(verbosity).unwrap_or(config_level);

    let filter = EnvFilter::try_from_env("POMOTIMER_LOG")
        .or_else(|_| EnvFilter::try_new(directive))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr)
        .try_init();
}
