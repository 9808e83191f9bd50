//! Notification text composition.
//!
//! A [`NotificationTemplate`] is built once per event and rendered once per
//! recipient, so the direct target reads "your design" while the owner and
//! members read the neutral phrasing and mentioned users read who mentioned
//! them. Directory lookups only improve the wording; a failed lookup falls
//! back to generic nouns.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use atelier_core::events::{DomainEvent, EventPayload};
use atelier_core::result::AppResult;
use atelier_core::types::id::{ProjectId, UserId};
use atelier_database::store::DirectoryStore;
use atelier_entity::notification::{NewNotification, NotificationType, RelatedEntityKind, deep_link};
use atelier_entity::project::Project;
use atelier_entity::stakeholder::{InclusionReason, Stakeholder};

/// Longest excerpt of free text quoted in a message.
const EXCERPT_CHARS: usize = 140;

/// Per-event notification content, before it is addressed to anyone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationTemplate {
    /// Notification type for non-mention recipients.
    pub notification_type: NotificationType,
    /// Short title.
    pub title: String,
    /// Neutral body for owners, members, and role holders.
    pub message: String,
    /// Body for the direct target, when it differs.
    pub target_message: Option<String>,
    /// Title and body for mentioned users.
    pub mention: Option<(String, String)>,
    /// Project the notification deep-links into.
    pub project_id: Option<ProjectId>,
    /// Related entity id.
    pub related_entity_id: Option<Uuid>,
    /// Related entity kind.
    pub related_entity_kind: Option<RelatedEntityKind>,
}

impl NotificationTemplate {
    /// A template with the same text for every recipient.
    pub fn new(
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            notification_type,
            title: title.into(),
            message: message.into(),
            target_message: None,
            mention: None,
            project_id: None,
            related_entity_id: None,
            related_entity_kind: None,
        }
    }

    /// Link the template to an entity inside a project.
    pub fn with_entity(
        mut self,
        project_id: ProjectId,
        kind: RelatedEntityKind,
        entity_id: impl Into<Uuid>,
    ) -> Self {
        self.project_id = Some(project_id);
        self.related_entity_kind = Some(kind);
        self.related_entity_id = Some(entity_id.into());
        self
    }

    fn with_target_message(mut self, message: String) -> Self {
        self.target_message = Some(message);
        self
    }

    fn with_mention(mut self, title: String, message: String) -> Self {
        self.mention = Some((title, message));
        self
    }

    /// Dashboard path, e.g. `/projects/{project}/designs/{id}`.
    pub fn link(&self) -> Option<String> {
        deep_link(
            self.project_id,
            self.related_entity_kind,
            self.related_entity_id,
        )
    }

    /// The consolidated daily-log reminder for one recipient.
    pub fn daily_log_reminder(projects: &[Project], date: NaiveDate) -> Self {
        let title = match projects {
            [_] => "Daily log missing".to_string(),
            _ => format!("Daily logs missing for {} projects", projects.len()),
        };
        let names: Vec<&str> = projects.iter().map(|p| p.name.as_str()).collect();
        let message = format!(
            "No daily log has been submitted for {date} on: {}. Please update the site diary.",
            names.join(", ")
        );
        let template = Self::new(NotificationType::General, title, message);
        match projects {
            [only] => template.with_entity(only.id, RelatedEntityKind::Project, only.id),
            _ => template,
        }
    }

    /// Address the template to one recipient.
    pub fn render_for(&self, stakeholder: Stakeholder) -> OutboundNotification {
        let (notification_type, title, message) = match stakeholder.reason {
            InclusionReason::DirectTarget(_) => (
                self.notification_type,
                self.title.clone(),
                self.target_message
                    .clone()
                    .unwrap_or_else(|| self.message.clone()),
            ),
            InclusionReason::Mentioned => match &self.mention {
                Some((title, message)) => {
                    (NotificationType::Mention, title.clone(), message.clone())
                }
                None => (self.notification_type, self.title.clone(), self.message.clone()),
            },
            InclusionReason::ProjectOwner
            | InclusionReason::ProjectMember
            | InclusionReason::DesignatedRole => {
                (self.notification_type, self.title.clone(), self.message.clone())
            }
        };

        OutboundNotification {
            user_id: stakeholder.user_id,
            reason: stakeholder.reason,
            notification_type,
            title,
            message,
            project_id: self.project_id,
            related_entity_id: self.related_entity_id,
            related_entity_kind: self.related_entity_kind,
            link: self.link(),
        }
    }
}

/// One recipient's copy of a notification, as handed to every channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundNotification {
    /// Recipient.
    pub user_id: UserId,
    /// Why the recipient was included.
    pub reason: InclusionReason,
    /// Notification type.
    pub notification_type: NotificationType,
    /// Title.
    pub title: String,
    /// Body.
    pub message: String,
    /// Project for deep-linking.
    pub project_id: Option<ProjectId>,
    /// Related entity id.
    pub related_entity_id: Option<Uuid>,
    /// Related entity kind.
    pub related_entity_kind: Option<RelatedEntityKind>,
    /// Dashboard path.
    pub link: Option<String>,
}

impl OutboundNotification {
    /// The inbox record this notification becomes.
    pub fn to_new_notification(&self) -> NewNotification {
        NewNotification {
            user_id: self.user_id,
            title: self.title.clone(),
            message: self.message.clone(),
            notification_type: self.notification_type,
            project_id: self.project_id,
            related_entity_id: self.related_entity_id,
            related_entity_kind: self.related_entity_kind,
        }
    }
}

/// Builds templates from domain events.
#[derive(Debug, Clone)]
pub struct TemplateComposer {
    directory: Arc<dyn DirectoryStore>,
}

impl TemplateComposer {
    /// Creates a new composer.
    pub fn new(directory: Arc<dyn DirectoryStore>) -> Self {
        Self { directory }
    }

    /// Compose the template for `event`.
    pub async fn compose(&self, event: &DomainEvent) -> NotificationTemplate {
        let actor = self
            .named(self.directory.find_user(event.actor_id).await, |u| {
                u.display_name
            })
            .unwrap_or_else(|| "Someone".to_string());
        let project_id = event.payload.project_id();
        let project = self
            .named(self.directory.find_project(project_id).await, |p| p.name)
            .map(|name| format!("\"{name}\""))
            .unwrap_or_else(|| "the project".to_string());

        match &event.payload {
            EventPayload::CommentAdded {
                design_file_id,
                comment,
                ..
            } => {
                let file = self.design_name(*design_file_id).await;
                let quote = excerpt(comment);
                NotificationTemplate::new(
                    NotificationType::CommentAdded,
                    format!("New comment on {file}"),
                    format!("{actor} commented on {file} in {project}: \"{quote}\""),
                )
                .with_target_message(format!(
                    "{actor} commented on your design {file}: \"{quote}\""
                ))
                .with_mention(
                    format!("{actor} mentioned you"),
                    format!("{actor} mentioned you in a comment on {file}: \"{quote}\""),
                )
                .with_entity(project_id, RelatedEntityKind::DesignFile, *design_file_id)
            }
            EventPayload::DesignUploaded { design_file_id, .. } => {
                let file = self.design_name(*design_file_id).await;
                NotificationTemplate::new(
                    NotificationType::DesignUploaded,
                    "New design uploaded",
                    format!("{actor} uploaded {file} to {project} for review"),
                )
                .with_entity(project_id, RelatedEntityKind::DesignFile, *design_file_id)
            }
            EventPayload::DesignReviewed {
                design_file_id,
                approved,
                feedback,
                ..
            } => {
                let file = self.design_name(*design_file_id).await;
                let (kind, title, verb) = if *approved {
                    (NotificationType::DesignApproved, "Design approved", "approved")
                } else {
                    (NotificationType::DesignRejected, "Design rejected", "rejected")
                };
                let note = feedback
                    .as_deref()
                    .map(|f| format!(". Feedback: \"{}\"", excerpt(f)))
                    .unwrap_or_default();
                NotificationTemplate::new(
                    kind,
                    title,
                    format!("{actor} {verb} {file} in {project}{note}"),
                )
                .with_target_message(format!("{actor} {verb} your design {file}{note}"))
                .with_mention(
                    format!("{actor} mentioned you"),
                    format!("{actor} mentioned you while reviewing {file}{note}"),
                )
                .with_entity(project_id, RelatedEntityKind::DesignFile, *design_file_id)
            }
            EventPayload::TaskAssigned { task_id, .. } => {
                let task = self.task_name(*task_id).await;
                NotificationTemplate::new(
                    NotificationType::TaskAssigned,
                    "New task assigned",
                    format!("{actor} assigned {task} in {project}"),
                )
                .with_target_message(format!("{actor} assigned you {task} in {project}"))
                .with_entity(project_id, RelatedEntityKind::Task, *task_id)
            }
            EventPayload::TaskStatusChanged {
                task_id, status, ..
            } => {
                let task = self.task_name(*task_id).await;
                NotificationTemplate::new(
                    NotificationType::ProjectUpdate,
                    "Task status updated",
                    format!("{actor} moved {task} to \"{status}\" in {project}"),
                )
                .with_target_message(format!("{actor} moved your task {task} to \"{status}\""))
                .with_entity(project_id, RelatedEntityKind::Task, *task_id)
            }
            EventPayload::BillReviewed {
                expense_id,
                approved,
                reason,
                ..
            } => {
                let bill = self
                    .named(self.directory.find_expense(*expense_id).await, |e| {
                        e.description
                    })
                    .map(|d| format!("\"{d}\""))
                    .unwrap_or_else(|| "a bill".to_string());
                let (kind, title, verb) = if *approved {
                    (NotificationType::BillApproved, "Bill approved", "approved")
                } else {
                    (NotificationType::BillRejected, "Bill rejected", "rejected")
                };
                let note = reason
                    .as_deref()
                    .map(|r| format!(". Reason: \"{}\"", excerpt(r)))
                    .unwrap_or_default();
                NotificationTemplate::new(
                    kind,
                    title,
                    format!("{actor} {verb} the bill {bill} in {project}{note}"),
                )
                .with_target_message(format!("{actor} {verb} your bill {bill}{note}"))
                .with_mention(
                    format!("{actor} mentioned you"),
                    format!("{actor} mentioned you while reviewing the bill {bill}{note}"),
                )
                .with_entity(project_id, RelatedEntityKind::Expense, *expense_id)
            }
            EventPayload::InventoryAdded {
                item_id, item_name, ..
            } => NotificationTemplate::new(
                NotificationType::InventoryAdded,
                "Inventory added",
                format!("{actor} added \"{item_name}\" to the inventory of {project}"),
            )
            .with_entity(project_id, RelatedEntityKind::InventoryItem, *item_id),
            EventPayload::ProjectUpdate { message, .. } => {
                let quote = excerpt(message);
                NotificationTemplate::new(
                    NotificationType::ProjectUpdate,
                    format!("Update on {project}"),
                    format!("{actor}: {quote}"),
                )
                .with_mention(
                    format!("{actor} mentioned you"),
                    format!("{actor} mentioned you in an update on {project}: \"{quote}\""),
                )
                .with_entity(project_id, RelatedEntityKind::Project, project_id)
            }
        }
    }

    async fn design_name(&self, id: atelier_core::types::id::DesignFileId) -> String {
        self.named(self.directory.find_design_file(id).await, |f| f.name)
            .map(|name| format!("\"{name}\""))
            .unwrap_or_else(|| "a design".to_string())
    }

    async fn task_name(&self, id: atelier_core::types::id::TaskId) -> String {
        self.named(self.directory.find_task(id).await, |t| t.title)
            .map(|title| format!("\"{title}\""))
            .unwrap_or_else(|| "a task".to_string())
    }

    fn named<T>(&self, lookup: AppResult<Option<T>>, name: impl FnOnce(T) -> String) -> Option<String> {
        match lookup {
            Ok(found) => found.map(name),
            Err(e) => {
                debug!(error = %e, "Template lookup failed, using generic wording");
                None
            }
        }
    }
}

/// Trim free text to a short single-line excerpt.
fn excerpt(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= EXCERPT_CHARS {
        return flat;
    }
    let cut: String = flat.chars().take(EXCERPT_CHARS).collect();
    format!("{}...", cut.trim_end())
}
