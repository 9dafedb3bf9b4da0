use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use wareflow_inventory::{SnapshotError, StoreError};

/// Serialized output of one analytics job run.
///
/// Hosts hand this to whatever wire layer they use; the typed result is
/// available from `LocalScheduler::run` when the caller needs it directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    /// Job kind, e.g. `inventory.abc_analysis`.
    pub kind: String,

    pub generated_at: DateTime<Utc>,

    /// Wall-clock time spent computing the result.
    pub duration_ms: u64,

    /// The job output as JSON.
    pub payload: JsonValue,
}

impl AnalyticsReport {
    pub fn new(kind: impl Into<String>, payload: JsonValue) -> Self {
        Self {
            kind: kind.into(),
            generated_at: Utc::now(),
            duration_ms: 0,
            payload,
        }
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("invalid job input: {0}")]
    InvalidInput(String),

    #[error("snapshot read failed: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("quantity update failed: {0}")]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}
