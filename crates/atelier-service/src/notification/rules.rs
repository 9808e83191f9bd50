//! Stakeholder resolution rules: who should hear about a domain event.
//!
//! Rules are applied additively and deduplicated by [`StakeholderSet`]:
//!
//! * the entity's direct target (uploader, assignee, submitter),
//! * the project owner,
//! * every member, for project-wide events,
//! * anyone `@mentioned` in the event's free text.
//!
//! Resolution never fails. A lookup error or a dangling reference yields an
//! empty set and a log line; the business action that raised the event is
//! never affected.

use std::sync::Arc;

use tracing::{debug, warn};

use atelier_core::error::AppError;
use atelier_core::events::{DomainEvent, EventPayload};
use atelier_core::result::AppResult;
use atelier_core::types::id::{ProjectId, UserId};
use atelier_database::store::DirectoryStore;
use atelier_entity::project::{Project, ProjectMember};
use atelier_entity::stakeholder::{InclusionReason, StakeholderSet, TargetRole};
use atelier_entity::user::UserProfile;

use super::mentions::resolve_mentions;

/// Resolves the recipients of a domain event.
#[derive(Debug, Clone)]
pub struct StakeholderResolver {
    directory: Arc<dyn DirectoryStore>,
}

impl StakeholderResolver {
    /// Creates a new resolver over the user and project directory.
    pub fn new(directory: Arc<dyn DirectoryStore>) -> Self {
        Self { directory }
    }

    /// Compute the stakeholder set for `event`.
    ///
    /// Returns an empty set if any lookup fails.
    pub async fn resolve(&self, event: &DomainEvent) -> StakeholderSet {
        match self.try_resolve(event).await {
            Ok(set) => {
                debug!(
                    event_id = %event.id,
                    event = event.payload.name(),
                    recipients = set.len(),
                    "Resolved stakeholders"
                );
                set
            }
            Err(e) => {
                warn!(
                    event_id = %event.id,
                    event = event.payload.name(),
                    error = %e,
                    "Stakeholder resolution failed, notifying nobody"
                );
                StakeholderSet::excluding(event.actor_id)
            }
        }
    }

    async fn try_resolve(&self, event: &DomainEvent) -> AppResult<StakeholderSet> {
        let mut set = if event.include_actor {
            StakeholderSet::open()
        } else {
            StakeholderSet::excluding(event.actor_id)
        };

        let project = self.project(event.payload.project_id()).await?;

        if let Some((target, role)) = self.direct_target(&event.payload).await? {
            set.insert(target, InclusionReason::DirectTarget(role));
        }

        set.insert(project.owner_id, InclusionReason::ProjectOwner);

        let free_text = event.payload.free_text().filter(|text| text.contains('@'));
        if event.payload.is_project_wide() || free_text.is_some() {
            let members = self.directory.project_members(project.id).await?;

            if event.payload.is_project_wide() {
                for member in &members {
                    set.insert(member.profile.id, InclusionReason::ProjectMember);
                }
            }

            if let Some(text) = free_text {
                let people = self.mention_candidates(&project, &members).await?;
                for user_id in resolve_mentions(text, people.iter()) {
                    set.insert(user_id, InclusionReason::Mentioned);
                }
            }
        }

        Ok(set)
    }

    async fn project(&self, project_id: ProjectId) -> AppResult<Project> {
        self.directory
            .find_project(project_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Project {project_id} not found")))
    }

    /// The single designated recipient of the event's entity, if the event
    /// kind has one.
    async fn direct_target(&self, payload: &EventPayload) -> AppResult<Option<(UserId, TargetRole)>> {
        match payload {
            EventPayload::CommentAdded { design_file_id, .. }
            | EventPayload::DesignReviewed { design_file_id, .. } => {
                let file = self
                    .directory
                    .find_design_file(*design_file_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::not_found(format!("Design file {design_file_id} not found"))
                    })?;
                Ok(Some((file.uploaded_by, TargetRole::Uploader)))
            }
            EventPayload::TaskAssigned { task_id, .. }
            | EventPayload::TaskStatusChanged { task_id, .. } => {
                let task = self
                    .directory
                    .find_task(*task_id)
                    .await?
                    .ok_or_else(|| AppError::not_found(format!("Task {task_id} not found")))?;
                Ok(task.assignee_id.map(|assignee| (assignee, TargetRole::Assignee)))
            }
            EventPayload::BillReviewed { expense_id, .. } => {
                let expense = self
                    .directory
                    .find_expense(*expense_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::not_found(format!("Expense {expense_id} not found"))
                    })?;
                Ok(Some((expense.submitted_by, TargetRole::Submitter)))
            }
            EventPayload::DesignUploaded { .. }
            | EventPayload::InventoryAdded { .. }
            | EventPayload::ProjectUpdate { .. } => Ok(None),
        }
    }

    /// Members plus the owner, who is not always listed as a member.
    async fn mention_candidates(
        &self,
        project: &Project,
        members: &[ProjectMember],
    ) -> AppResult<Vec<UserProfile>> {
        let mut people: Vec<UserProfile> = members.iter().map(|m| m.profile.clone()).collect();
        if !people.iter().any(|p| p.id == project.owner_id) {
            if let Some(owner) = self.directory.find_user(project.owner_id).await? {
                people.push(owner);
            }
        }
        Ok(people)
    }
}
