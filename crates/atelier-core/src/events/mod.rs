//! Domain events that may produce notifications.
//!
//! The business layer (projects, tasks, invoices) emits a [`DomainEvent`]
//! after its own write succeeds. The notification pipeline consumes it; no
//! event is ever required to produce a notification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::id::{DesignFileId, ExpenseId, InventoryItemId, ProjectId, TaskId, UserId};

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The user who caused the event.
    pub actor_id: UserId,
    /// Whether the actor should also receive the notification.
    #[serde(default)]
    pub include_actor: bool,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of all notification-worthy domain events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    /// A comment was added to a design file.
    CommentAdded {
        /// Project containing the design file.
        project_id: ProjectId,
        /// The commented design file.
        design_file_id: DesignFileId,
        /// Comment body, scanned for mentions.
        comment: String,
    },
    /// A design file was uploaded for review.
    DesignUploaded {
        /// Project the design belongs to.
        project_id: ProjectId,
        /// The uploaded design file.
        design_file_id: DesignFileId,
    },
    /// A design file was approved or rejected.
    DesignReviewed {
        /// Project the design belongs to.
        project_id: ProjectId,
        /// The reviewed design file.
        design_file_id: DesignFileId,
        /// Review outcome.
        approved: bool,
        /// Optional reviewer feedback, scanned for mentions.
        feedback: Option<String>,
    },
    /// A task was assigned to a member.
    TaskAssigned {
        /// Project the task belongs to.
        project_id: ProjectId,
        /// The assigned task.
        task_id: TaskId,
    },
    /// A task changed status.
    TaskStatusChanged {
        /// Project the task belongs to.
        project_id: ProjectId,
        /// The task.
        task_id: TaskId,
        /// New status label.
        status: String,
    },
    /// A submitted expense (bill) was approved or rejected.
    BillReviewed {
        /// Project the expense was booked against.
        project_id: ProjectId,
        /// The reviewed expense.
        expense_id: ExpenseId,
        /// Review outcome.
        approved: bool,
        /// Optional rejection reason.
        reason: Option<String>,
    },
    /// An inventory item was added to a project.
    InventoryAdded {
        /// Project receiving the item.
        project_id: ProjectId,
        /// The new item.
        item_id: InventoryItemId,
        /// Display name of the item.
        item_name: String,
    },
    /// A general update posted to the whole project.
    ProjectUpdate {
        /// The project.
        project_id: ProjectId,
        /// Update text, scanned for mentions.
        message: String,
    },
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(actor_id: UserId, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor_id,
            include_actor: false,
            payload,
        }
    }

    /// Request that the actor is notified as well.
    pub fn including_actor(mut self) -> Self {
        self.include_actor = true;
        self
    }
}

impl EventPayload {
    /// The project every event is scoped to.
    pub fn project_id(&self) -> ProjectId {
        match self {
            Self::CommentAdded { project_id, .. }
            | Self::DesignUploaded { project_id, .. }
            | Self::DesignReviewed { project_id, .. }
            | Self::TaskAssigned { project_id, .. }
            | Self::TaskStatusChanged { project_id, .. }
            | Self::BillReviewed { project_id, .. }
            | Self::InventoryAdded { project_id, .. }
            | Self::ProjectUpdate { project_id, .. } => *project_id,
        }
    }

    /// Free text that may contain `@handle` mentions.
    pub fn free_text(&self) -> Option<&str> {
        match self {
            Self::CommentAdded { comment, .. } => Some(comment),
            Self::DesignReviewed { feedback, .. } => feedback.as_deref(),
            Self::ProjectUpdate { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Whether the event is broadcast to every project member.
    pub fn is_project_wide(&self) -> bool {
        matches!(self, Self::ProjectUpdate { .. } | Self::InventoryAdded { .. })
    }

    /// Stable event name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CommentAdded { .. } => "comment_added",
            Self::DesignUploaded { .. } => "design_uploaded",
            Self::DesignReviewed { .. } => "design_reviewed",
            Self::TaskAssigned { .. } => "task_assigned",
            Self::TaskStatusChanged { .. } => "task_status_changed",
            Self::BillReviewed { .. } => "bill_reviewed",
            Self::InventoryAdded { .. } => "inventory_added",
            Self::ProjectUpdate { .. } => "project_update",
        }
    }
}
