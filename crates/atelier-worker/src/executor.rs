//! Scheduled job contract and a logging runner.

use std::time::Instant;

use async_trait::async_trait;
use serde_json::Value;

use atelier_core::error::AppError;

/// A unit of scheduled work.
#[async_trait]
pub trait ScheduledJob: Send + Sync + std::fmt::Debug + 'static {
    /// Stable job name used in logs.
    fn name(&self) -> &'static str;

    /// Run once and return a JSON summary.
    async fn run(&self) -> Result<Value, JobExecutionError>;
}

/// Error from job execution
#[derive(Debug, thiserror::Error)]
pub enum JobExecutionError {
    /// Permanent failure, rerunning will not help
    #[error("Permanent job failure: {0}")]
    Permanent(String),

    /// Transient failure, the next scheduled run may succeed
    #[error("Transient job failure: {0}")]
    Transient(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] AppError),
}

/// Run `job` once, logging its outcome and duration.
pub async fn run_job(job: &dyn ScheduledJob) -> Result<Value, JobExecutionError> {
    let started = Instant::now();
    tracing::info!(job = job.name(), "Running scheduled job");

    let result = job.run().await;
    let elapsed_ms = started.elapsed().as_millis() as u64;
    match &result {
        Ok(summary) => {
            tracing::info!(job = job.name(), elapsed_ms, summary = %summary, "Scheduled job finished")
        }
        Err(e) => tracing::error!(job = job.name(), elapsed_ms, error = %e, "Scheduled job failed"),
    }
    result
}
