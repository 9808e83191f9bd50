//! Notification delivery configuration.

use serde::{Deserialize, Serialize};

/// Delivery channels and inbox limits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Push gateway settings. Push is disabled when `app_id` is empty.
    #[serde(default)]
    pub push: PushConfig,
    /// Messaging gateway settings. Messaging is disabled when `account_sid` is empty.
    #[serde(default)]
    pub messaging: MessagingConfig,
    /// Inbox read and retention limits.
    #[serde(default)]
    pub inbox: InboxConfig,
}

/// Push gateway (OneSignal-compatible REST API).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// Gateway base URL.
    #[serde(default = "default_push_url")]
    pub base_url: String,
    /// Application identifier at the gateway.
    #[serde(default)]
    pub app_id: String,
    /// REST API key.
    #[serde(default)]
    pub api_key: String,
    /// Public web origin used to build absolute deep links.
    #[serde(default)]
    pub web_origin: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            base_url: default_push_url(),
            app_id: String::new(),
            api_key: String::new(),
            web_origin: String::new(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl PushConfig {
    /// Whether enough settings are present to send.
    pub fn is_enabled(&self) -> bool {
        !self.app_id.is_empty() && !self.api_key.is_empty()
    }
}

/// Messaging gateway (Twilio-compatible REST API, SMS or WhatsApp).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagingConfig {
    /// Gateway base URL.
    #[serde(default = "default_messaging_url")]
    pub base_url: String,
    /// Account identifier.
    #[serde(default)]
    pub account_sid: String,
    /// Account auth token.
    #[serde(default)]
    pub auth_token: String,
    /// Sender address, e.g. `whatsapp:+14155238886`.
    #[serde(default)]
    pub from: String,
    /// Prefix prepended to recipient addresses (`"whatsapp:"` or empty for SMS).
    #[serde(default)]
    pub address_prefix: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            base_url: default_messaging_url(),
            account_sid: String::new(),
            auth_token: String::new(),
            from: String::new(),
            address_prefix: String::new(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl MessagingConfig {
    /// Whether enough settings are present to send.
    pub fn is_enabled(&self) -> bool {
        !self.account_sid.is_empty() && !self.auth_token.is_empty() && !self.from.is_empty()
    }
}

/// Inbox read and retention limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboxConfig {
    /// Default number of records returned by the inbox read API.
    #[serde(default = "default_page_limit")]
    pub default_limit: u32,
    /// Upper bound accepted for `limit`.
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,
    /// Records older than this are removed by the retention job.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    /// Maximum records kept per user by the retention job.
    #[serde(default = "default_max_per_user")]
    pub max_per_user: u32,
}

impl Default for InboxConfig {
    fn default() -> Self {
        Self {
            default_limit: default_page_limit(),
            max_limit: default_max_limit(),
            retention_days: default_retention_days(),
            max_per_user: default_max_per_user(),
        }
    }
}

fn default_push_url() -> String {
    "https://onesignal.com/api/v1".to_string()
}

fn default_messaging_url() -> String {
    "https://api.twilio.com/2010-04-01".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_page_limit() -> u32 {
    20
}

fn default_max_limit() -> u32 {
    100
}

fn default_retention_days() -> u32 {
    60
}

fn default_max_per_user() -> u32 {
    500
}
