//! Diagnostic logging to stderr via `tracing`.
//!
//! `RUST_LOG` wins when set. Otherwise the level follows the CLI flags:
//! `-q` warn, default info, `-v` debug, `-vv` trace.
//! `PHONORATE_LOG_FORMAT=json` switches to one JSON object per line.

use tracing_subscriber::EnvFilter;

/// Filter directive for the given flags.
pub fn default_directive(verbosity: u8, quiet: bool) -> &'static str {
    match (quiet, verbosity) {
        (true, _) => "phonorate=warn",
        (false, 0) => "phonorate=info",
        (false, 1) => "phonorate=debug",
        (false, _) => "phonorate=trace",
    }
}

fn json_requested() -> bool {
    std::env::var("PHONORATE_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(verbosity: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity, quiet)));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbosity > 0)
        .with_thread_ids(verbosity > 1);

    let installed = if json_requested() {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    };
    if installed.is_err() {
        tracing::trace!("subscriber already installed");
    }
}
