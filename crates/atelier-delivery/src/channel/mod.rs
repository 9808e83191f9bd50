//! Delivery channels.
//!
//! Every channel implements [`ChannelSender`]. Senders never return errors:
//! a failure is logged inside the sender and reported as `false`, so one
//! channel can never disturb another.

pub mod in_app;
pub mod messaging;
pub mod push;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use atelier_core::types::id::UserId;
use atelier_service::OutboundNotification;

pub use in_app::InAppChannel;
pub use messaging::MessagingChannel;
pub use push::PushChannel;

/// Delivery surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryChannel {
    /// Inbox record.
    InApp,
    /// Push gateway.
    Push,
    /// SMS / WhatsApp gateway.
    Messaging,
}

impl fmt::Display for DeliveryChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InApp => write!(f, "in_app"),
            Self::Push => write!(f, "push"),
            Self::Messaging => write!(f, "messaging"),
        }
    }
}

/// Who a channel delivers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    /// The recipient user.
    pub user_id: UserId,
    /// External messaging address, when the user has one.
    pub contact_address: Option<String>,
}

impl Recipient {
    /// A recipient known only by id.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            contact_address: None,
        }
    }

    /// Attach a messaging address.
    pub fn with_contact_address(mut self, address: Option<String>) -> Self {
        self.contact_address = address;
        self
    }
}

/// A delivery surface.
#[async_trait]
pub trait ChannelSender: Send + Sync + fmt::Debug + 'static {
    /// Which surface this sender delivers to.
    fn channel(&self) -> DeliveryChannel;

    /// Whether the channel is configured. Disabled channels are skipped.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Deliver one notification. Returns `false` on any failure.
    async fn send(&self, recipient: &Recipient, notification: &OutboundNotification) -> bool;
}
