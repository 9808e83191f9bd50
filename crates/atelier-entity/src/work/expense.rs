//! Expense (bill) entity.

use serde::{Deserialize, Serialize};

use atelier_core::types::id::{ExpenseId, ProjectId, UserId};

/// A bill submitted against a project for approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Expense {
    /// Unique expense identifier.
    pub id: ExpenseId,
    /// Project the expense is booked against.
    pub project_id: ProjectId,
    /// Short description.
    pub description: String,
    /// Amount in minor currency units.
    pub amount_minor: i64,
    /// Who submitted it.
    pub submitted_by: UserId,
}
