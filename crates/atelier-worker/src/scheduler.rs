//! Cron scheduler for the reminder sweep and inbox retention.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use atelier_core::error::AppError;

use crate::executor::{ScheduledJob, run_job};

/// Cron-based scheduler for periodic background tasks
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    /// Number of registered schedules
    registered: usize,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler")
            .field("registered", &self.registered)
            .finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new() -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self {
            scheduler,
            registered: 0,
        })
    }

    /// Run `job` at every six-field cron expression in `schedules` (UTC).
    pub async fn register(
        &mut self,
        schedules: &[String],
        job: Arc<dyn ScheduledJob>,
    ) -> Result<(), AppError> {
        for schedule in schedules {
            let runner = Arc::clone(&job);
            let cron = CronJob::new_async(schedule.as_str(), move |_uuid, _lock| {
                let job = Arc::clone(&runner);
                Box::pin(async move {
                    // Errors are logged by run_job; the next tick tries again.
                    let _ = run_job(job.as_ref()).await;
                })
            })
            .map_err(|e| {
                AppError::configuration(format!(
                    "Invalid schedule '{schedule}' for {}: {e}",
                    job.name()
                ))
            })?;

            self.scheduler.add(cron).await.map_err(|e| {
                AppError::internal(format!("Failed to add {} schedule: {e}", job.name()))
            })?;

            self.registered += 1;
            tracing::info!(job = job.name(), schedule = %schedule, "Registered scheduled job");
        }
        Ok(())
    }

    /// Number of registered schedules
    pub fn registered(&self) -> usize {
        self.registered
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!(schedules = self.registered, "Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }
}
