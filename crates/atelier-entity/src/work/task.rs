//! Project task entity.

use serde::{Deserialize, Serialize};

use atelier_core::types::id::{ProjectId, TaskId, UserId};

/// A unit of project work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Task {
    /// Unique task identifier.
    pub id: TaskId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Task title.
    pub title: String,
    /// Current assignee, if any.
    pub assignee_id: Option<UserId>,
    /// Who created the task.
    pub created_by: UserId,
}
