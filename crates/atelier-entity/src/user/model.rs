//! User directory entry.

use serde::{Deserialize, Serialize};

use atelier_core::types::id::UserId;

/// The directory view of a user, as needed for notification routing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct UserProfile {
    /// Unique user identifier.
    pub id: UserId,
    /// Human-readable display name.
    pub display_name: String,
    /// Mention handle, without the leading `@`.
    pub handle: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Phone number for external messaging, in E.164 form.
    pub contact_address: Option<String>,
    /// Application role (`admin`, `designer`, `site_supervisor`, ...).
    pub role: String,
    /// Free-form job title.
    pub designation: Option<String>,
}

impl UserProfile {
    /// The part of the email address before `@`.
    pub fn email_local_part(&self) -> Option<&str> {
        self.email
            .as_deref()
            .and_then(|email| email.split_once('@'))
            .map(|(local, _)| local)
            .filter(|local| !local.is_empty())
    }

    /// A usable external messaging address, if any.
    pub fn messaging_address(&self) -> Option<&str> {
        self.contact_address
            .as_deref()
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
    }

    /// Whether the role or designation matches any of `roles`.
    ///
    /// Matching ignores case and treats `_`, `-` and spaces alike, so
    /// `site_supervisor` matches `Site Supervisor`.
    pub fn has_any_role(&self, roles: &[String]) -> bool {
        role_matches(&self.role, roles)
            || self
                .designation
                .as_deref()
                .is_some_and(|designation| role_matches(designation, roles))
    }
}

/// Whether `candidate` names any of `roles`, ignoring case and separators.
pub fn role_matches(candidate: &str, roles: &[String]) -> bool {
    let candidate = normalize_role(candidate);
    !candidate.is_empty() && roles.iter().any(|wanted| normalize_role(wanted) == candidate)
}

fn normalize_role(role: &str) -> String {
    role.trim()
        .chars()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
