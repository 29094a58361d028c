//! Logger setup for the CLI.
//!
//! Logs go to stderr through `env_logger`, leaving stdout for results.
//! `RUST_LOG` takes precedence over the `-v` flags.

use env_logger::Env;

/// Initializes the global logger.
///
/// Verbosity 0 logs at `warn`. Each `-v` raises this crate's level one
/// step (`info`, `debug`, then `trace`); other crates stay at `warn`.
pub fn init(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // A second initialization (e.g. from tests) is not an error worth reporting.
    let _ = env_logger::Builder::from_env(
        Env::default().default_filter_or(format!("warn,datapub={level}")),
    )
    .format_timestamp(None)
    .format_target(false)
    .try_init();
}
