//! Structured logging for the API process.
//!
//! Emits JSON lines so the audit trail and request logs stay machine
//! parseable in production. `RUST_LOG` overrides the default filter.

use tracing_subscriber::fmt::time::SystemTime;
use tracing_subscriber::EnvFilter;

/// Filter applied when `RUST_LOG` is unset.
const DEFAULT_DIRECTIVES: &str = "info";

/// Install the process-wide subscriber.
///
/// Calling this again after a subscriber is installed is a no-op, which
/// lets tests call it freely.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(SystemTime)
        .try_init();
}
