//! Site daily log entity.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use atelier_core::types::id::{ProjectId, UserId};

/// A daily site log; one is expected per active project per day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DailyLog {
    /// Unique log identifier.
    pub id: Uuid,
    /// The project logged.
    pub project_id: ProjectId,
    /// Business-local date the log covers.
    pub log_date: NaiveDate,
    /// Who submitted it.
    pub submitted_by: UserId,
    /// When it was submitted.
    pub created_at: DateTime<Utc>,
}
