//! Scheduled work for Atelier.
//!
//! This crate provides:
//! - The daily-log reminder sweep, run by cron or by the HTTP trigger
//! - The inbox retention job
//! - A cron scheduler that registers both at their configured times

pub mod executor;
pub mod jobs;
pub mod scheduler;

pub use executor::{JobExecutionError, ScheduledJob, run_job};
pub use jobs::{DailyLogReminderJob, RetentionJob, SweepSummary};
pub use scheduler::CronScheduler;
