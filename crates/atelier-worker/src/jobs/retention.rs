//! Inbox retention: drop old records and cap each inbox.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::Value;

use atelier_core::config::InboxConfig;
use atelier_database::store::NotificationStore;

use crate::executor::{JobExecutionError, ScheduledJob};

/// Deletes expired notifications and trims every inbox to its maximum size.
#[derive(Debug, Clone)]
pub struct RetentionJob {
    store: Arc<dyn NotificationStore>,
    config: InboxConfig,
}

impl RetentionJob {
    /// Create the job.
    pub fn new(store: Arc<dyn NotificationStore>, config: InboxConfig) -> Self {
        Self { store, config }
    }
}

#[async_trait]
impl ScheduledJob for RetentionJob {
    fn name(&self) -> &'static str {
        "notification_retention"
    }

    async fn run(&self) -> Result<Value, JobExecutionError> {
        let cutoff = Utc::now() - Duration::days(i64::from(self.config.retention_days));

        let expired = self.store.delete_older_than(cutoff).await.map_err(|e| {
            JobExecutionError::Transient(format!("Notification cleanup failed: {e}"))
        })?;
        let overflow = self
            .store
            .trim_per_user(self.config.max_per_user)
            .await
            .map_err(|e| {
                JobExecutionError::Transient(format!("Notification per-user trim failed: {e}"))
            })?;

        tracing::info!(expired, overflow, "Notification retention applied");

        Ok(serde_json::json!({
            "task": "notification_retention",
            "expired_removed": expired,
            "overflow_removed": overflow,
            "retention_days": self.config.retention_days,
            "max_per_user": self.config.max_per_user,
        }))
    }
}
