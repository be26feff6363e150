//! Logging setup shared by the API binary and its integration tests.

pub mod tracing;

/// Initialize process-wide observability.
///
/// Delegates to [`tracing::init`]; repeated calls are no-ops.
pub fn init() {
    tracing::init();
}
