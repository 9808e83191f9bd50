//! Request context carrying the authenticated user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use atelier_core::types::id::UserId;

/// Context for the current authenticated request.
///
/// Built by the API's auth extractor and passed into service methods so
/// that every inbox operation is scoped to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: UserId,
    /// The user's application role at the time the token was issued.
    pub role: Option<String>,
    /// Email claim, when the token carries one.
    pub email: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: UserId, role: Option<String>, email: Option<String>) -> Self {
        Self {
            user_id,
            role,
            email,
            request_time: Utc::now(),
        }
    }

    /// Context for a user with no extra claims.
    pub fn for_user(user_id: UserId) -> Self {
        Self::new(user_id, None, None)
    }
}
