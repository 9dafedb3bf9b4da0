//! Tracing/logging setup shared by hosts embedding the analytics engine.

/// Initialize process-wide observability (JSON logs unless
/// `WAREFLOW_LOG_FORMAT=pretty`).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::from_env());
}

/// Initialize process-wide observability with an explicit output format.
pub fn init_with(format: tracing::LogFormat) {
    tracing::init(format);
}

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use crate::tracing::LogFormat;
