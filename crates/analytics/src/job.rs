use serde::Serialize;

use crate::result::AnalyticsError;

/// A single-shot analytics computation over an in-memory snapshot.
///
/// Jobs receive their inputs at construction time (no implicit session or
/// shared context) and must not mutate warehouse state from `run`.
pub trait AnalyticsJob: Send + Sync {
    type Output: Serialize + Send;

    /// Stable job kind used for logging and report envelopes.
    fn kind(&self) -> &'static str;

    /// Execute the computation.
    fn run(&self) -> Result<Self::Output, AnalyticsError>;
}
