//! Inbox channel: writes the notification record.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use atelier_database::store::NotificationStore;
use atelier_service::OutboundNotification;

use super::{ChannelSender, DeliveryChannel, Recipient};

/// Persists one [`NotificationRecord`] per delivery.
///
/// [`NotificationRecord`]: atelier_entity::notification::NotificationRecord
#[derive(Debug, Clone)]
pub struct InAppChannel {
    store: Arc<dyn NotificationStore>,
}

impl InAppChannel {
    /// Create a channel writing to `store`.
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ChannelSender for InAppChannel {
    fn channel(&self) -> DeliveryChannel {
        DeliveryChannel::InApp
    }

    async fn send(&self, recipient: &Recipient, notification: &OutboundNotification) -> bool {
        match self.store.create(notification.to_new_notification()).await {
            Ok(record) => {
                debug!(
                    user_id = %recipient.user_id,
                    notification_id = %record.id,
                    notification_type = %record.notification_type,
                    "Stored in-app notification"
                );
                true
            }
            Err(e) => {
                error!(
                    user_id = %recipient.user_id,
                    error = %e,
                    "Failed to store in-app notification"
                );
                false
            }
        }
    }
}
