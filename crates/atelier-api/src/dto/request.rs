//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use atelier_core::events::{DomainEvent, EventPayload};
use atelier_core::types::id::UserId;

/// Query parameters for listing the inbox.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ListNotificationsQuery {
    /// How many of the most recent records to return.
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
}

/// A domain event posted by the business layer after its own write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishEventRequest {
    /// Notify the caller too (self-assigned tasks).
    #[serde(default)]
    pub include_actor: bool,
    /// What happened.
    pub payload: EventPayload,
}

impl PublishEventRequest {
    /// The event, attributed to the authenticated caller.
    pub fn into_event(self, actor: UserId) -> DomainEvent {
        let event = DomainEvent::new(actor, self.payload);
        if self.include_actor {
            event.including_actor()
        } else {
            event
        }
    }
}
