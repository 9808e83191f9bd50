//! Daily-log reminder configuration.

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

/// Settings for the missing-daily-log reminder sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemindersConfig {
    /// Whether the cron trigger is registered at startup.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Six-field cron expressions (UTC) at which the sweep runs.
    #[serde(default = "default_schedules")]
    pub schedules: Vec<String>,
    /// Offset of the business time zone from UTC, in minutes.
    ///
    /// "Today" for daily logs is evaluated in this zone.
    #[serde(default = "default_offset")]
    pub utc_offset_minutes: i32,
    /// Roles or designations (case-insensitive) that receive reminders.
    #[serde(default = "default_roles")]
    pub recipient_roles: Vec<String>,
    /// Shared secret expected in the `x-cron-secret` header of the HTTP trigger.
    #[serde(default)]
    pub trigger_secret: String,
    /// Six-field cron expression (UTC) for the inbox retention job.
    #[serde(default = "default_retention_schedule")]
    pub retention_schedule: String,
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            schedules: default_schedules(),
            utc_offset_minutes: default_offset(),
            recipient_roles: default_roles(),
            trigger_secret: String::new(),
            retention_schedule: default_retention_schedule(),
        }
    }
}

impl RemindersConfig {
    /// The business time zone, falling back to UTC on an out-of-range offset.
    pub fn time_zone(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix())
    }
}

fn default_true() -> bool {
    true
}

fn default_schedules() -> Vec<String> {
    // 11:30 and 17:30 IST
    vec!["0 0 6 * * *".to_string(), "0 0 12 * * *".to_string()]
}

fn default_offset() -> i32 {
    330
}

fn default_roles() -> Vec<String> {
    vec![
        "site supervisor".to_string(),
        "site engineer".to_string(),
        "project manager".to_string(),
    ]
}

fn default_retention_schedule() -> String {
    "0 0 21 * * *".to_string()
}
