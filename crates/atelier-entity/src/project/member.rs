//! Project membership.

use serde::{Deserialize, Serialize};

use atelier_core::types::id::ProjectId;

use crate::user::UserProfile;
use crate::user::model::role_matches;

/// A user's membership in a project, joined with their directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProjectMember {
    /// The project.
    pub project_id: ProjectId,
    /// Role within this project, in addition to the user's global role.
    pub project_role: Option<String>,
    /// The member's directory entry.
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub profile: UserProfile,
}

impl ProjectMember {
    /// Whether the member's global or project role matches any of `roles`.
    pub fn has_any_role(&self, roles: &[String]) -> bool {
        self.profile.has_any_role(roles)
            || self
                .project_role
                .as_deref()
                .is_some_and(|role| role_matches(role, roles))
    }
}
