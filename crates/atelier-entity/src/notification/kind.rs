//! Notification type and related-entity enumerations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Closed set of notification types shown in the inbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "notification_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// A task was assigned to the recipient.
    TaskAssigned,
    /// A design the recipient uploaded was approved.
    DesignApproved,
    /// A design the recipient uploaded was rejected.
    DesignRejected,
    /// A new design was uploaded for review.
    DesignUploaded,
    /// A project-wide update or task status change.
    ProjectUpdate,
    /// Inventory was added to a project.
    InventoryAdded,
    /// A comment was added to a design.
    CommentAdded,
    /// An expense the recipient submitted was approved.
    BillApproved,
    /// An expense the recipient submitted was rejected.
    BillRejected,
    /// The recipient was mentioned in free text.
    Mention,
    /// Anything else, including reminders.
    General,
}

impl NotificationType {
    /// Return the type as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskAssigned => "task_assigned",
            Self::DesignApproved => "design_approved",
            Self::DesignRejected => "design_rejected",
            Self::DesignUploaded => "design_uploaded",
            Self::ProjectUpdate => "project_update",
            Self::InventoryAdded => "inventory_added",
            Self::CommentAdded => "comment_added",
            Self::BillApproved => "bill_approved",
            Self::BillRejected => "bill_rejected",
            Self::Mention => "mention",
            Self::General => "general",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task_assigned" => Ok(Self::TaskAssigned),
            "design_approved" => Ok(Self::DesignApproved),
            "design_rejected" => Ok(Self::DesignRejected),
            "design_uploaded" => Ok(Self::DesignUploaded),
            "project_update" => Ok(Self::ProjectUpdate),
            "inventory_added" => Ok(Self::InventoryAdded),
            "comment_added" => Ok(Self::CommentAdded),
            "bill_approved" => Ok(Self::BillApproved),
            "bill_rejected" => Ok(Self::BillRejected),
            "mention" => Ok(Self::Mention),
            "general" => Ok(Self::General),
            other => Err(format!("Unknown notification type: '{other}'")),
        }
    }
}

/// Kind of entity a notification deep-links to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "related_entity_kind", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum RelatedEntityKind {
    /// A project.
    Project,
    /// A design file.
    DesignFile,
    /// A task.
    Task,
    /// An expense.
    Expense,
    /// An inventory item.
    InventoryItem,
}

impl RelatedEntityKind {
    /// Path segment used when building dashboard deep links.
    pub fn route_segment(&self) -> &'static str {
        match self {
            Self::Project => "overview",
            Self::DesignFile => "designs",
            Self::Task => "tasks",
            Self::Expense => "expenses",
            Self::InventoryItem => "inventory",
        }
    }
}
