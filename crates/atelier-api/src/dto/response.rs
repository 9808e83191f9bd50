//! Response DTOs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use atelier_entity::notification::NotificationRecord;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// One inbox entry with its dashboard link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResponse {
    /// The stored record.
    #[serde(flatten)]
    pub record: NotificationRecord,
    /// Dashboard path, when the record links anywhere.
    pub link: Option<String>,
}

impl From<NotificationRecord> for NotificationResponse {
    fn from(record: NotificationRecord) -> Self {
        let link = record.deep_link();
        Self { record, link }
    }
}

/// Count response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    /// The count.
    pub count: u64,
}

/// Accepted event acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventAcceptedResponse {
    /// Identifier assigned to the event, for log correlation.
    pub event_id: Uuid,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Server version.
    pub version: String,
}
