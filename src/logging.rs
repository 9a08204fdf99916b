//! Diagnostics setup shared by the binaries.
//!
//! Library code only emits `tracing` events; nothing is printed unless a
//! binary installs a subscriber with [`init`]. `RUST_LOG` wins over the
//! verbosity flag when set.

use tracing_subscriber::EnvFilter;

/// Filter directive for a `-v` count: warnings by default, then debug, then
/// trace.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "metromap=warn",
        1 => "metromap=debug",
        _ => "metromap=trace",
    }
}

/// Install a stderr fmt subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
