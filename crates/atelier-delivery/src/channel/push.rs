//! Push channel: OneSignal-compatible REST gateway.
//!
//! Recipients are addressed by external user id, which the dashboard
//! registers with the gateway at login. A recipient with no registered
//! device comes back without a notification id and counts as a failure.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use atelier_core::config::PushConfig;
use atelier_core::error::{AppError, ErrorKind};
use atelier_core::result::AppResult;
use atelier_service::OutboundNotification;

use super::{ChannelSender, DeliveryChannel, Recipient};

/// Gateway reply. `id` is empty when nobody was reachable.
#[derive(Debug, Deserialize)]
struct PushResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    errors: Option<serde_json::Value>,
}

/// Sends push notifications through the configured gateway.
#[derive(Debug, Clone)]
pub struct PushChannel {
    client: reqwest::Client,
    config: PushConfig,
}

impl PushChannel {
    /// Build the channel and its HTTP client.
    pub fn new(config: PushConfig) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        if config.is_enabled() {
            let auth = HeaderValue::from_str(&format!("Basic {}", config.api_key)).map_err(|e| {
                AppError::configuration(format!("Invalid push API key header value: {e}"))
            })?;
            headers.insert(AUTHORIZATION, auth);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build push client", e)
            })?;

        Ok(Self { client, config })
    }

    fn payload(&self, recipient: &Recipient, notification: &OutboundNotification) -> serde_json::Value {
        let mut body = json!({
            "app_id": self.config.app_id,
            "include_external_user_ids": [recipient.user_id.to_string()],
            "channel_for_external_user_ids": "push",
            "headings": { "en": notification.title },
            "contents": { "en": notification.message },
            "data": {
                "notification_type": notification.notification_type,
                "reason": notification.reason.to_string(),
                "project_id": notification.project_id,
                "related_entity_id": notification.related_entity_id,
                "related_entity_kind": notification.related_entity_kind,
            },
        });
        if let Some(link) = &notification.link {
            body["web_url"] = json!(format!(
                "{}{link}",
                self.config.web_origin.trim_end_matches('/')
            ));
        }
        body
    }
}

#[async_trait]
impl ChannelSender for PushChannel {
    fn channel(&self) -> DeliveryChannel {
        DeliveryChannel::Push
    }

    fn is_enabled(&self) -> bool {
        self.config.is_enabled()
    }

    async fn send(&self, recipient: &Recipient, notification: &OutboundNotification) -> bool {
        let url = format!("{}/notifications", self.config.base_url.trim_end_matches('/'));
        let response = match self
            .client
            .post(&url)
            .json(&self.payload(recipient, notification))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(user_id = %recipient.user_id, error = %e, "Push request failed");
                return false;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(user_id = %recipient.user_id, status = %status, body = %body, "Push gateway rejected notification");
            return false;
        }

        match response.json::<PushResponse>().await {
            Ok(PushResponse { id: Some(id), .. }) if !id.is_empty() => {
                debug!(user_id = %recipient.user_id, push_id = %id, "Push notification sent");
                true
            }
            Ok(PushResponse { errors, .. }) => {
                debug!(
                    user_id = %recipient.user_id,
                    errors = ?errors,
                    "Recipient has no registered push device"
                );
                false
            }
            Err(e) => {
                warn!(user_id = %recipient.user_id, error = %e, "Unreadable push gateway response");
                false
            }
        }
    }
}
