//! Process-local store for development and tests.
//!
//! Holds the directory and every inbox in concurrent maps. Nothing survives
//! a restart. Failure injection hooks let tests exercise the degraded paths
//! of the pipeline without a database.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::{DashMap, DashSet};
use tracing::debug;

use atelier_core::error::AppError;
use atelier_core::result::AppResult;
use atelier_core::types::id::{
    DesignFileId, ExpenseId, NotificationId, ProjectId, TaskId, UserId,
};
use atelier_entity::notification::{NewNotification, NotificationRecord};
use atelier_entity::project::{DailyLog, Project, ProjectMember, ProjectStatus};
use atelier_entity::user::UserProfile;
use atelier_entity::work::{DesignFile, Expense, Task};

use crate::store::{DirectoryStore, NotificationStore};

/// In-memory implementation of both store traits.
///
/// Cloning is cheap and clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    users: DashMap<UserId, UserProfile>,
    projects: DashMap<ProjectId, Project>,
    members: DashMap<ProjectId, Vec<(UserId, Option<String>)>>,
    design_files: DashMap<DesignFileId, DesignFile>,
    tasks: DashMap<TaskId, Task>,
    expenses: DashMap<ExpenseId, Expense>,
    daily_logs: DashMap<ProjectId, Vec<DailyLog>>,
    /// Inbox per user, oldest first.
    inboxes: DashMap<UserId, Vec<NotificationRecord>>,
    failing_projects: DashSet<ProjectId>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a user.
    pub fn insert_user(&self, user: UserProfile) {
        self.inner.users.insert(user.id, user);
    }

    /// Add or replace a project.
    pub fn insert_project(&self, project: Project) {
        self.inner.projects.insert(project.id, project);
    }

    /// Add a user to a project with an optional project-level role.
    pub fn add_member(&self, project_id: ProjectId, user_id: UserId, project_role: Option<&str>) {
        let mut members = self.inner.members.entry(project_id).or_default();
        members.retain(|(existing, _)| *existing != user_id);
        members.push((user_id, project_role.map(str::to_string)));
    }

    /// Add or replace a design file.
    pub fn insert_design_file(&self, file: DesignFile) {
        self.inner.design_files.insert(file.id, file);
    }

    /// Add or replace a task.
    pub fn insert_task(&self, task: Task) {
        self.inner.tasks.insert(task.id, task);
    }

    /// Add or replace an expense.
    pub fn insert_expense(&self, expense: Expense) {
        self.inner.expenses.insert(expense.id, expense);
    }

    /// Record a submitted daily log.
    pub fn insert_daily_log(&self, log: DailyLog) {
        self.inner
            .daily_logs
            .entry(log.project_id)
            .or_default()
            .push(log);
    }

    /// Make every lookup touching `project_id` fail.
    pub fn fail_project_lookups(&self, project_id: ProjectId) {
        self.inner.failing_projects.insert(project_id);
    }

    /// Make notification writes fail (or succeed again).
    pub fn fail_notification_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Every record in a user's inbox, newest first.
    pub fn inbox(&self, user_id: UserId) -> Vec<NotificationRecord> {
        self.inner
            .inboxes
            .get(&user_id)
            .map(|records| records.iter().rev().cloned().collect())
            .unwrap_or_default()
    }

    /// Total number of records across all inboxes.
    pub fn notification_count(&self) -> usize {
        self.inner.inboxes.iter().map(|entry| entry.len()).sum()
    }

    /// Insert a fully formed record, bypassing id and timestamp generation.
    pub fn insert_notification(&self, record: NotificationRecord) {
        let mut inbox = self.inner.inboxes.entry(record.user_id).or_default();
        inbox.push(record);
        inbox.sort_by_key(|r| r.created_at);
    }

    fn check_project(&self, project_id: ProjectId) -> AppResult<()> {
        if self.inner.failing_projects.contains(&project_id) {
            return Err(AppError::database(format!(
                "Simulated lookup failure for project {project_id}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn create(&self, new: NewNotification) -> AppResult<NotificationRecord> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::database("Simulated notification write failure"));
        }
        let record = new.into_record(Utc::now());
        self.inner
            .inboxes
            .entry(record.user_id)
            .or_default()
            .push(record.clone());
        debug!(notification_id = %record.id, user_id = %record.user_id, "Stored notification");
        Ok(record)
    }

    async fn list_recent(&self, user_id: UserId, limit: u32) -> AppResult<Vec<NotificationRecord>> {
        Ok(self
            .inbox(user_id)
            .into_iter()
            .take(limit as usize)
            .collect())
    }

    async fn count_unread(&self, user_id: UserId) -> AppResult<u64> {
        Ok(self
            .inner
            .inboxes
            .get(&user_id)
            .map(|records| records.iter().filter(|r| r.is_unread()).count() as u64)
            .unwrap_or(0))
    }

    async fn mark_read(&self, user_id: UserId, id: NotificationId) -> AppResult<bool> {
        let Some(mut records) = self.inner.inboxes.get_mut(&user_id) else {
            return Ok(false);
        };
        match records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                if record.is_unread() {
                    record.is_read = true;
                    record.updated_at = Utc::now();
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_read(&self, user_id: UserId) -> AppResult<u64> {
        let Some(mut records) = self.inner.inboxes.get_mut(&user_id) else {
            return Ok(0);
        };
        let now = Utc::now();
        let mut changed = 0;
        for record in records.iter_mut().filter(|r| r.is_unread()) {
            record.is_read = true;
            record.updated_at = now;
            changed += 1;
        }
        Ok(changed)
    }

    async fn delete(&self, user_id: UserId, id: NotificationId) -> AppResult<bool> {
        let Some(mut records) = self.inner.inboxes.get_mut(&user_id) else {
            return Ok(false);
        };
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() < before)
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let mut removed = 0;
        for mut entry in self.inner.inboxes.iter_mut() {
            let before = entry.len();
            entry.retain(|r| r.created_at >= cutoff);
            removed += (before - entry.len()) as u64;
        }
        Ok(removed)
    }

    async fn trim_per_user(&self, keep: u32) -> AppResult<u64> {
        let keep = keep as usize;
        let mut removed = 0;
        for mut entry in self.inner.inboxes.iter_mut() {
            if entry.len() > keep {
                let excess = entry.len() - keep;
                entry.drain(..excess);
                removed += excess as u64;
            }
        }
        Ok(removed)
    }
}

#[async_trait]
impl DirectoryStore for MemoryStore {
    async fn find_user(&self, id: UserId) -> AppResult<Option<UserProfile>> {
        Ok(self.inner.users.get(&id).map(|u| u.clone()))
    }

    async fn find_project(&self, id: ProjectId) -> AppResult<Option<Project>> {
        self.check_project(id)?;
        Ok(self.inner.projects.get(&id).map(|p| p.clone()))
    }

    async fn project_members(&self, project_id: ProjectId) -> AppResult<Vec<ProjectMember>> {
        self.check_project(project_id)?;
        let Some(entries) = self.inner.members.get(&project_id) else {
            return Ok(Vec::new());
        };
        let mut members: Vec<ProjectMember> = entries
            .iter()
            .filter_map(|(user_id, project_role)| {
                self.inner.users.get(user_id).map(|profile| ProjectMember {
                    project_id,
                    project_role: project_role.clone(),
                    profile: profile.clone(),
                })
            })
            .collect();
        members.sort_by_key(|m| m.profile.id);
        Ok(members)
    }

    async fn find_design_file(&self, id: DesignFileId) -> AppResult<Option<DesignFile>> {
        Ok(self.inner.design_files.get(&id).map(|f| f.clone()))
    }

    async fn find_task(&self, id: TaskId) -> AppResult<Option<Task>> {
        Ok(self.inner.tasks.get(&id).map(|t| t.clone()))
    }

    async fn find_expense(&self, id: ExpenseId) -> AppResult<Option<Expense>> {
        Ok(self.inner.expenses.get(&id).map(|e| e.clone()))
    }

    async fn active_projects(&self) -> AppResult<Vec<Project>> {
        let mut projects: Vec<Project> = self
            .inner
            .projects
            .iter()
            .filter(|p| p.status == ProjectStatus::Active)
            .map(|p| p.clone())
            .collect();
        projects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(projects)
    }

    async fn projects_logged_on(&self, date: NaiveDate) -> AppResult<Vec<ProjectId>> {
        Ok(self
            .inner
            .daily_logs
            .iter()
            .filter(|entry| entry.iter().any(|log| log.log_date == date))
            .map(|entry| *entry.key())
            .collect())
    }
}
