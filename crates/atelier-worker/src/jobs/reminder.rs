//! Missing daily-log reminder sweep.
//!
//! Finds every active project without a daily log dated today in the
//! business time zone and nudges the people responsible for it. A person
//! responsible for several such projects receives one reminder that lists
//! all of them. Reminders skip the inbox and go out over push and
//! messaging only.
//!
//! The sweep never schedules itself; cron or the HTTP trigger invokes it.
//! Overlapping invocations may send duplicate reminders.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;

use atelier_core::config::RemindersConfig;
use atelier_core::result::AppResult;
use atelier_core::types::id::UserId;
use atelier_database::store::DirectoryStore;
use atelier_delivery::{DispatchMode, FanOutDispatcher};
use atelier_entity::project::Project;
use atelier_entity::stakeholder::{InclusionReason, StakeholderSet};
use atelier_service::NotificationTemplate;

use crate::executor::{JobExecutionError, ScheduledJob};

/// Counts from one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepSummary {
    /// Active projects examined.
    pub projects_scanned: usize,
    /// Active projects without today's log.
    pub missing: usize,
    /// Consolidated reminders dispatched, one per recipient.
    pub reminders_sent: usize,
    /// Lookups that failed; affected projects were left out of this run.
    pub failures: usize,
}

/// One recipient's share of the sweep.
struct PendingReminder {
    reason: InclusionReason,
    projects: Vec<Project>,
}

/// Sweeps active projects for missing daily logs.
#[derive(Debug, Clone)]
pub struct DailyLogReminderJob {
    directory: Arc<dyn DirectoryStore>,
    dispatcher: Arc<FanOutDispatcher>,
    config: RemindersConfig,
}

impl DailyLogReminderJob {
    /// Create the job.
    pub fn new(
        directory: Arc<dyn DirectoryStore>,
        dispatcher: Arc<FanOutDispatcher>,
        config: RemindersConfig,
    ) -> Self {
        Self {
            directory,
            dispatcher,
            config,
        }
    }

    /// Run the sweep for today in the business time zone.
    pub async fn sweep(&self) -> SweepSummary {
        let today = Utc::now().with_timezone(&self.config.time_zone()).date_naive();
        self.sweep_on(today).await
    }

    /// Run the sweep for `date`.
    ///
    /// Never fails: errors are logged and counted in the summary.
    pub async fn sweep_on(&self, date: NaiveDate) -> SweepSummary {
        let mut summary = SweepSummary::default();

        let missing = match self.missing_projects(date).await {
            Ok((scanned, missing)) => {
                summary.projects_scanned = scanned;
                summary.missing = missing.len();
                missing
            }
            Err(e) => {
                tracing::error!(%date, error = %e, "Daily log sweep could not list projects");
                summary.failures += 1;
                return summary;
            }
        };

        let mut pending: BTreeMap<UserId, PendingReminder> = BTreeMap::new();
        for project in missing {
            match self.recipients_for(&project).await {
                Ok(recipients) => {
                    for (user_id, reason) in recipients {
                        let entry = pending.entry(user_id).or_insert_with(|| PendingReminder {
                            reason,
                            projects: Vec::new(),
                        });
                        if reason == InclusionReason::DesignatedRole {
                            entry.reason = reason;
                        }
                        entry.projects.push(project.clone());
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        project_id = %project.id,
                        error = %e,
                        "Skipping project, recipient lookup failed"
                    );
                    summary.failures += 1;
                }
            }
        }

        let dispatches = pending.iter().map(|(user_id, reminder)| {
            let template = NotificationTemplate::daily_log_reminder(&reminder.projects, date);
            let recipients = StakeholderSet::single(*user_id, reminder.reason);
            async move {
                self.dispatcher
                    .dispatch(&recipients, &template, DispatchMode::SkipInbox)
                    .await
            }
        });
        summary.reminders_sent = join_all(dispatches).await.len();

        tracing::info!(
            %date,
            projects_scanned = summary.projects_scanned,
            missing = summary.missing,
            reminders_sent = summary.reminders_sent,
            failures = summary.failures,
            "Daily log sweep complete"
        );
        summary
    }

    /// Active projects, and those among them without a log on `date`.
    async fn missing_projects(&self, date: NaiveDate) -> AppResult<(usize, Vec<Project>)> {
        let active = self.directory.active_projects().await?;
        let logged: HashSet<_> = self
            .directory
            .projects_logged_on(date)
            .await?
            .into_iter()
            .collect();
        let scanned = active.len();
        let missing = active
            .into_iter()
            .filter(|project| !logged.contains(&project.id))
            .collect();
        Ok((scanned, missing))
    }

    /// Members holding a reminder role, plus the owner.
    async fn recipients_for(&self, project: &Project) -> AppResult<Vec<(UserId, InclusionReason)>> {
        let members = self.directory.project_members(project.id).await?;
        let mut recipients: Vec<(UserId, InclusionReason)> = members
            .iter()
            .filter(|member| member.has_any_role(&self.config.recipient_roles))
            .map(|member| (member.profile.id, InclusionReason::DesignatedRole))
            .collect();
        if !recipients.iter().any(|(user_id, _)| *user_id == project.owner_id) {
            recipients.push((project.owner_id, InclusionReason::ProjectOwner));
        }
        Ok(recipients)
    }
}

#[async_trait]
impl ScheduledJob for DailyLogReminderJob {
    fn name(&self) -> &'static str {
        "daily_log_reminder"
    }

    async fn run(&self) -> Result<Value, JobExecutionError> {
        let summary = self.sweep().await;
        serde_json::to_value(summary)
            .map_err(|e| JobExecutionError::Permanent(format!("Unserializable sweep summary: {e}")))
    }
}
