//! Shared application state passed to all handlers.

use std::sync::Arc;

use atelier_core::config::AppConfig;
use atelier_delivery::Notifier;
use atelier_service::InboxService;
use atelier_worker::DailyLogReminderJob;

use crate::auth::JwtDecoder;

/// Handler state. Every field is cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Arc<AppConfig>,
    /// Access token verification.
    pub jwt_decoder: Arc<JwtDecoder>,
    /// The caller's inbox.
    pub inbox: Arc<InboxService>,
    /// Event intake into the notification pipeline.
    pub notifier: Notifier,
    /// Daily-log reminder sweep, for the HTTP trigger.
    pub reminders: Arc<DailyLogReminderJob>,
}

impl AppState {
    /// Assemble state from constructed services.
    pub fn new(
        config: Arc<AppConfig>,
        inbox: Arc<InboxService>,
        notifier: Notifier,
        reminders: Arc<DailyLogReminderJob>,
    ) -> Self {
        let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));
        Self {
            config,
            jwt_decoder,
            inbox,
            notifier,
            reminders,
        }
    }
}
