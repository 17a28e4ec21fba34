//! Tracing/logging setup shared by every portal client binary and test harness.

/// Initialize process-wide tracing.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::from_env());
}

/// Subscriber configuration (filters, output format).
pub mod tracing;
