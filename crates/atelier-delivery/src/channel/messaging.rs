//! External messaging channel: Twilio-compatible SMS / WhatsApp gateway.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tracing::{debug, warn};

use atelier_core::config::MessagingConfig;
use atelier_core::error::{AppError, ErrorKind};
use atelier_core::result::AppResult;
use atelier_service::OutboundNotification;

use super::{ChannelSender, DeliveryChannel, Recipient};

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
}

/// Sends a short text to the recipient's contact address.
#[derive(Debug, Clone)]
pub struct MessagingChannel {
    client: reqwest::Client,
    config: MessagingConfig,
}

impl MessagingChannel {
    /// Build the channel and its HTTP client.
    pub fn new(config: MessagingConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build messaging client",
                    e,
                )
            })?;
        Ok(Self { client, config })
    }

    /// Gateway address for a contact, e.g. `whatsapp:+919800000000`.
    fn to_address(&self, contact: &str) -> String {
        let prefix = &self.config.address_prefix;
        if prefix.is_empty() || contact.starts_with(prefix.as_str()) {
            contact.to_string()
        } else {
            format!("{prefix}{contact}")
        }
    }
}

/// Message text: title and body on separate lines.
fn message_text(notification: &OutboundNotification) -> String {
    format!("{}\n{}", notification.title, notification.message)
}

#[async_trait]
impl ChannelSender for MessagingChannel {
    fn channel(&self) -> DeliveryChannel {
        DeliveryChannel::Messaging
    }

    fn is_enabled(&self) -> bool {
        self.config.is_enabled()
    }

    async fn send(&self, recipient: &Recipient, notification: &OutboundNotification) -> bool {
        let Some(contact) = recipient.contact_address.as_deref() else {
            debug!(user_id = %recipient.user_id, "No contact address, skipping messaging");
            return false;
        };

        let to = self.to_address(contact);
        let text = message_text(notification);
        let form = match serde_urlencoded::to_string([
            ("To", to.as_str()),
            ("From", self.config.from.as_str()),
            ("Body", text.as_str()),
        ]) {
            Ok(form) => form,
            Err(e) => {
                warn!(user_id = %recipient.user_id, error = %e, "Failed to encode message");
                return false;
            }
        };

        let url = format!(
            "{}/Accounts/{}/Messages.json",
            self.config.base_url.trim_end_matches('/'),
            self.config.account_sid
        );
        let response = match self
            .client
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(user_id = %recipient.user_id, error = %e, "Messaging request failed");
                return false;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(user_id = %recipient.user_id, status = %status, body = %body, "Messaging gateway rejected message");
            return false;
        }

        match response.json::<MessageResponse>().await {
            Ok(message) => {
                debug!(user_id = %recipient.user_id, sid = %message.sid, "Message sent");
                true
            }
            Err(e) => {
                warn!(user_id = %recipient.user_id, error = %e, "Unreadable messaging gateway response");
                false
            }
        }
    }
}
