//! Storage seams used by the notification pipeline.
//!
//! Services depend on these traits rather than on a concrete pool so the
//! same code runs against PostgreSQL in production and [`MemoryStore`]
//! in development and tests.
//!
//! [`MemoryStore`]: crate::memory::MemoryStore

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use atelier_core::result::AppResult;
use atelier_core::types::id::{
    DesignFileId, ExpenseId, NotificationId, ProjectId, TaskId, UserId,
};
use atelier_entity::notification::{NewNotification, NotificationRecord};
use atelier_entity::project::{Project, ProjectMember};
use atelier_entity::user::UserProfile;
use atelier_entity::work::{DesignFile, Expense, Task};

/// Durable per-user inbox.
#[async_trait]
pub trait NotificationStore: Send + Sync + Debug + 'static {
    /// Persist a new unread record.
    async fn create(&self, new: NewNotification) -> AppResult<NotificationRecord>;

    /// The user's most recent records, newest first.
    async fn list_recent(&self, user_id: UserId, limit: u32) -> AppResult<Vec<NotificationRecord>>;

    /// Number of unread records for the user.
    async fn count_unread(&self, user_id: UserId) -> AppResult<u64>;

    /// Mark one record read. Returns `false` when the user owns no such record.
    ///
    /// Marking an already-read record succeeds without changing it.
    async fn mark_read(&self, user_id: UserId, id: NotificationId) -> AppResult<bool>;

    /// Mark every unread record of the user read, returning how many changed.
    async fn mark_all_read(&self, user_id: UserId) -> AppResult<u64>;

    /// Delete one record. Returns `false` when the user owns no such record.
    async fn delete(&self, user_id: UserId, id: NotificationId) -> AppResult<bool>;

    /// Delete every record created before `cutoff`.
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;

    /// Keep only the newest `keep` records of each user.
    async fn trim_per_user(&self, keep: u32) -> AppResult<u64>;
}

/// Read-only view of users, projects, and work items.
#[async_trait]
pub trait DirectoryStore: Send + Sync + Debug + 'static {
    /// Look up a user profile.
    async fn find_user(&self, id: UserId) -> AppResult<Option<UserProfile>>;

    /// Look up a project.
    async fn find_project(&self, id: ProjectId) -> AppResult<Option<Project>>;

    /// Members of a project with their profiles.
    async fn project_members(&self, project_id: ProjectId) -> AppResult<Vec<ProjectMember>>;

    /// Look up a design file.
    async fn find_design_file(&self, id: DesignFileId) -> AppResult<Option<DesignFile>>;

    /// Look up a task.
    async fn find_task(&self, id: TaskId) -> AppResult<Option<Task>>;

    /// Look up an expense.
    async fn find_expense(&self, id: ExpenseId) -> AppResult<Option<Expense>>;

    /// Every project currently in the active state.
    async fn active_projects(&self) -> AppResult<Vec<Project>>;

    /// Projects with at least one daily log dated `date`.
    async fn projects_logged_on(&self, date: NaiveDate) -> AppResult<Vec<ProjectId>>;
}
