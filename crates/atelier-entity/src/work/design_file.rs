//! Design file entity.

use serde::{Deserialize, Serialize};

use atelier_core::types::id::{DesignFileId, ProjectId, UserId};

/// A design deliverable uploaded for client or admin review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DesignFile {
    /// Unique file identifier.
    pub id: DesignFileId,
    /// Owning project.
    pub project_id: ProjectId,
    /// File display name.
    pub name: String,
    /// The uploader, who is the direct target of comments and reviews.
    pub uploaded_by: UserId,
}
