//! Subscriber setup for the `roster` binary.
//!
//! The library only emits `tracing` events; installing a subscriber is left to
//! the binary. Output goes to stderr so that tables printed on stdout stay
//! clean.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Install a stderr fmt subscriber.
///
/// `RUST_LOG` takes precedence when set; otherwise `level` (an `EnvFilter`
/// directive such as `info` or `staff_roster=debug`) is used.
pub fn init_logging(level: &str) -> Result<(), String> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).map_err(|e| format!("invalid log level '{level}': {e}"))?,
    };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| format!("failed to initialize logging: {e}"))
}
