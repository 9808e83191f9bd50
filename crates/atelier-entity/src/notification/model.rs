//! Notification record model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use atelier_core::types::id::{NotificationId, ProjectId, UserId};

use super::kind::{NotificationType, RelatedEntityKind};

/// One entry in a user's inbox.
///
/// Recipient and content never change after creation; only `is_read` does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct NotificationRecord {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// The recipient user.
    pub user_id: UserId,
    /// Short title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Notification type.
    pub notification_type: NotificationType,
    /// Project the related entity belongs to, for deep-linking.
    pub project_id: Option<ProjectId>,
    /// Weak reference to the entity the notification is about.
    pub related_entity_id: Option<Uuid>,
    /// Kind of the related entity.
    pub related_entity_kind: Option<RelatedEntityKind>,
    /// Whether the recipient has read the notification.
    pub is_read: bool,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
    /// When the read flag last changed.
    pub updated_at: DateTime<Utc>,
}

impl NotificationRecord {
    /// Check if the notification is unread.
    pub fn is_unread(&self) -> bool {
        !self.is_read
    }

    /// Dashboard path this notification opens, when it links anywhere.
    pub fn deep_link(&self) -> Option<String> {
        deep_link(
            self.project_id,
            self.related_entity_kind,
            self.related_entity_id,
        )
    }
}

/// Build the dashboard path `/projects/{project}/{kind}/{id}`.
///
/// Without a project there is nowhere to link; without a specific entity
/// the link opens the project itself.
pub fn deep_link(
    project_id: Option<ProjectId>,
    kind: Option<RelatedEntityKind>,
    entity_id: Option<Uuid>,
) -> Option<String> {
    let project = project_id?;
    match (kind, entity_id) {
        (Some(RelatedEntityKind::Project), _) | (None, _) | (Some(_), None) => {
            Some(format!("/projects/{project}"))
        }
        (Some(kind), Some(id)) => Some(format!(
            "/projects/{project}/{}/{id}",
            kind.route_segment()
        )),
    }
}

/// Data required to create a notification record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNotification {
    /// The recipient user.
    pub user_id: UserId,
    /// Short title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Notification type.
    pub notification_type: NotificationType,
    /// Project for deep-linking.
    pub project_id: Option<ProjectId>,
    /// Related entity id.
    pub related_entity_id: Option<Uuid>,
    /// Related entity kind.
    pub related_entity_kind: Option<RelatedEntityKind>,
}

impl NewNotification {
    /// Dashboard path the record will open.
    pub fn deep_link(&self) -> Option<String> {
        deep_link(
            self.project_id,
            self.related_entity_kind,
            self.related_entity_id,
        )
    }

    /// Materialize the record with a fresh id and timestamps.
    pub fn into_record(self, now: DateTime<Utc>) -> NotificationRecord {
        NotificationRecord {
            id: NotificationId::new(),
            user_id: self.user_id,
            title: self.title,
            message: self.message,
            notification_type: self.notification_type,
            project_id: self.project_id,
            related_entity_id: self.related_entity_id,
            related_entity_kind: self.related_entity_kind,
            is_read: false,
            created_at: now,
            updated_at: now,
        }
    }
}
