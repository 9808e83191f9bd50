//! Project entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use atelier_core::types::id::{ProjectId, UserId};

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "project_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Work is ongoing; daily logs are expected.
    Active,
    /// Temporarily paused.
    OnHold,
    /// Handed over.
    Completed,
    /// Abandoned.
    Cancelled,
}

/// An interior-design project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Project {
    /// Unique project identifier.
    pub id: ProjectId,
    /// Display name.
    pub name: String,
    /// Administrative owner.
    pub owner_id: UserId,
    /// Lifecycle status.
    pub status: ProjectStatus,
    /// When the project was created.
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Whether daily logs are expected for this project.
    pub fn is_active(&self) -> bool {
        self.status == ProjectStatus::Active
    }
}
