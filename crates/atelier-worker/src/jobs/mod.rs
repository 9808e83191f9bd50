//! Built-in scheduled jobs.

pub mod reminder;
pub mod retention;

pub use reminder::{DailyLogReminderJob, SweepSummary};
pub use retention::RetentionJob;
