use std::time::Instant;

use tracing::{info, warn};

use crate::job::AnalyticsJob;
use crate::result::{AnalyticsError, AnalyticsReport};

/// Object-safe view of a job whose output is reported as JSON.
///
/// Lets heterogeneous jobs run side by side in `LocalScheduler::run_all`.
pub trait ReportJob: Send + Sync {
    fn kind(&self) -> &'static str;

    fn run_json(&self) -> Result<serde_json::Value, AnalyticsError>;
}

impl<J: AnalyticsJob> ReportJob for J {
    fn kind(&self) -> &'static str {
        AnalyticsJob::kind(self)
    }

    fn run_json(&self) -> Result<serde_json::Value, AnalyticsError> {
        let output = self.run()?;
        serde_json::to_value(output).map_err(|e| AnalyticsError::Internal(e.to_string()))
    }
}

/// Synchronous scheduler that runs jobs in-process.
#[derive(Debug, Copy, Clone, Default)]
pub struct LocalScheduler;

impl LocalScheduler {
    pub fn new() -> Self {
        Self
    }

    /// Run a job and return its typed output.
    pub fn run<J: AnalyticsJob>(&self, job: &J) -> Result<J::Output, AnalyticsError> {
        let kind = AnalyticsJob::kind(job);
        let started = Instant::now();
        let result = job.run();
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => info!(job = kind, elapsed_ms, "analytics job completed"),
            Err(e) => warn!(job = kind, elapsed_ms, error = %e, "analytics job failed"),
        }
        result
    }

    /// Run a job and wrap its output in a report envelope.
    pub fn report(&self, job: &dyn ReportJob) -> Result<AnalyticsReport, AnalyticsError> {
        let kind = job.kind();
        let started = Instant::now();
        let payload = job.run_json();
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match payload {
            Ok(payload) => {
                info!(job = kind, elapsed_ms, "analytics report generated");
                Ok(AnalyticsReport::new(kind, payload).with_duration_ms(elapsed_ms))
            }
            Err(e) => {
                warn!(job = kind, elapsed_ms, error = %e, "analytics report failed");
                Err(e)
            }
        }
    }

    /// Run independent jobs concurrently on scoped threads.
    ///
    /// Results come back in the same order as `jobs`. Jobs share no mutable
    /// state, so one failure does not affect the others.
    pub fn run_all(
        &self,
        jobs: &[&dyn ReportJob],
    ) -> Vec<Result<AnalyticsReport, AnalyticsError>> {
        std::thread::scope(|scope| {
            let handles: Vec<_> = jobs
                .iter()
                .map(|job| scope.spawn(move || self.report(*job)))
                .collect();

            handles
                .into_iter()
                .map(|h| {
                    h.join().unwrap_or_else(|_| {
                        Err(AnalyticsError::Internal("analytics job panicked".to_string()))
                    })
                })
                .collect()
        })
    }
}
