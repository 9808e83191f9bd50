//! Directory repository: users, projects, memberships, and work items.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use atelier_core::error::{AppError, ErrorKind};
use atelier_core::result::AppResult;
use atelier_core::types::id::{DesignFileId, ExpenseId, ProjectId, TaskId, UserId};
use atelier_entity::project::{Project, ProjectMember, ProjectStatus};
use atelier_entity::user::UserProfile;
use atelier_entity::work::{DesignFile, Expense, Task};

use crate::store::DirectoryStore;

const USER_COLUMNS: &str = "u.id, u.display_name, u.handle, u.email, u.contact_address, u.role, u.designation";

/// Read-only repository over the directory tables.
#[derive(Debug, Clone)]
pub struct DirectoryRepository {
    pool: PgPool,
}

impl DirectoryRepository {
    /// Create a new directory repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DirectoryStore for DirectoryRepository {
    async fn find_user(&self, id: UserId) -> AppResult<Option<UserProfile>> {
        sqlx::query_as::<_, UserProfile>(&format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    async fn find_project(&self, id: ProjectId) -> AppResult<Option<Project>> {
        sqlx::query_as::<_, Project>(
            "SELECT id, name, owner_id, status, created_at FROM projects WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find project", e))
    }

    async fn project_members(&self, project_id: ProjectId) -> AppResult<Vec<ProjectMember>> {
        sqlx::query_as::<_, ProjectMember>(&format!(
            "SELECT m.project_id, m.project_role, {USER_COLUMNS} \
             FROM project_members m JOIN users u ON u.id = m.user_id \
             WHERE m.project_id = $1 ORDER BY u.id"
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list project members", e)
        })
    }

    async fn find_design_file(&self, id: DesignFileId) -> AppResult<Option<DesignFile>> {
        sqlx::query_as::<_, DesignFile>(
            "SELECT id, project_id, name, uploaded_by FROM design_files WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find design file", e))
    }

    async fn find_task(&self, id: TaskId) -> AppResult<Option<Task>> {
        sqlx::query_as::<_, Task>(
            "SELECT id, project_id, title, assignee_id, created_by FROM tasks WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find task", e))
    }

    async fn find_expense(&self, id: ExpenseId) -> AppResult<Option<Expense>> {
        sqlx::query_as::<_, Expense>(
            "SELECT id, project_id, description, amount_minor, submitted_by FROM expenses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find expense", e))
    }

    async fn active_projects(&self) -> AppResult<Vec<Project>> {
        sqlx::query_as::<_, Project>(
            "SELECT id, name, owner_id, status, created_at FROM projects \
             WHERE status = $1 ORDER BY name",
        )
        .bind(ProjectStatus::Active)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list active projects", e)
        })
    }

    async fn projects_logged_on(&self, date: NaiveDate) -> AppResult<Vec<ProjectId>> {
        sqlx::query_scalar::<_, ProjectId>(
            "SELECT DISTINCT project_id FROM daily_logs WHERE log_date = $1",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list daily logs", e))
    }
}
