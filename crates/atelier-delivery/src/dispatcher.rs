//! Fan-out dispatcher: every recipient through every channel.
//!
//! Recipients are delivered concurrently and all outcomes are settled
//! before the report is returned. For each recipient the inbox record is
//! written first; push and messaging then run side by side. A channel
//! failure is counted and logged, never retried, and never undoes the
//! inbox record.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use atelier_database::store::DirectoryStore;
use atelier_entity::stakeholder::StakeholderSet;
use atelier_service::{NotificationTemplate, OutboundNotification};

use crate::channel::{ChannelSender, Recipient};

/// Which channels a dispatch uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Inbox record, push, and messaging.
    Full,
    /// Push and messaging only, for ephemeral nudges such as reminders.
    SkipInbox,
}

/// What happened on one channel for one recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Delivered,
    Failed,
    Skipped,
}

/// Per-channel counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChannelTally {
    /// Sends that returned `true`.
    pub delivered: usize,
    /// Sends that returned `false`.
    pub failed: usize,
    /// Recipients the channel was not attempted for.
    pub skipped: usize,
}

impl ChannelTally {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Delivered => self.delivered += 1,
            Outcome::Failed => self.failed += 1,
            Outcome::Skipped => self.skipped += 1,
        }
    }
}

/// Summary of one dispatch, for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// Number of recipients.
    pub recipients: usize,
    /// Inbox channel counts.
    pub in_app: ChannelTally,
    /// Push channel counts.
    pub push: ChannelTally,
    /// Messaging channel counts.
    pub messaging: ChannelTally,
}

struct RecipientOutcome {
    in_app: Outcome,
    push: Outcome,
    messaging: Outcome,
}

/// Drives stakeholders through the channel senders.
#[derive(Debug, Clone)]
pub struct FanOutDispatcher {
    directory: Arc<dyn DirectoryStore>,
    in_app: Arc<dyn ChannelSender>,
    push: Arc<dyn ChannelSender>,
    messaging: Arc<dyn ChannelSender>,
}

impl FanOutDispatcher {
    /// Create a dispatcher over the three channels.
    pub fn new(
        directory: Arc<dyn DirectoryStore>,
        in_app: Arc<dyn ChannelSender>,
        push: Arc<dyn ChannelSender>,
        messaging: Arc<dyn ChannelSender>,
    ) -> Self {
        Self {
            directory,
            in_app,
            push,
            messaging,
        }
    }

    /// Deliver `template` to every stakeholder.
    pub async fn dispatch(
        &self,
        stakeholders: &StakeholderSet,
        template: &NotificationTemplate,
        mode: DispatchMode,
    ) -> DispatchReport {
        let deliveries = stakeholders
            .iter()
            .map(|stakeholder| self.deliver(template.render_for(stakeholder), mode));
        let outcomes = join_all(deliveries).await;

        let mut report = DispatchReport {
            recipients: outcomes.len(),
            ..DispatchReport::default()
        };
        for outcome in outcomes {
            report.in_app.record(outcome.in_app);
            report.push.record(outcome.push);
            report.messaging.record(outcome.messaging);
        }

        info!(
            notification_type = %template.notification_type,
            recipients = report.recipients,
            in_app_delivered = report.in_app.delivered,
            in_app_failed = report.in_app.failed,
            push_delivered = report.push.delivered,
            push_failed = report.push.failed,
            messaging_delivered = report.messaging.delivered,
            messaging_failed = report.messaging.failed,
            "Dispatch complete"
        );
        report
    }

    async fn deliver(&self, notification: OutboundNotification, mode: DispatchMode) -> RecipientOutcome {
        let recipient = Recipient::new(notification.user_id);

        let in_app = match mode {
            DispatchMode::Full => send_on(self.in_app.as_ref(), &recipient, &notification).await,
            DispatchMode::SkipInbox => Outcome::Skipped,
        };

        let recipient = recipient.with_contact_address(self.contact_address(&notification).await);
        let messaging = async {
            if recipient.contact_address.is_none() {
                debug!(user_id = %recipient.user_id, "No contact address, messaging skipped");
                return Outcome::Skipped;
            }
            send_on(self.messaging.as_ref(), &recipient, &notification).await
        };
        let (push, messaging) = tokio::join!(
            send_on(self.push.as_ref(), &recipient, &notification),
            messaging
        );

        RecipientOutcome {
            in_app,
            push,
            messaging,
        }
    }

    async fn contact_address(&self, notification: &OutboundNotification) -> Option<String> {
        if !self.messaging.is_enabled() {
            return None;
        }
        match self.directory.find_user(notification.user_id).await {
            Ok(profile) => profile.and_then(|p| p.messaging_address().map(str::to_string)),
            Err(e) => {
                warn!(user_id = %notification.user_id, error = %e, "Recipient lookup failed, messaging skipped");
                None
            }
        }
    }
}

async fn send_on(
    channel: &dyn ChannelSender,
    recipient: &Recipient,
    notification: &OutboundNotification,
) -> Outcome {
    if !channel.is_enabled() {
        return Outcome::Skipped;
    }
    if channel.send(recipient, notification).await {
        Outcome::Delivered
    } else {
        warn!(
            channel = %channel.channel(),
            user_id = %recipient.user_id,
            "Channel delivery failed"
        );
        Outcome::Failed
    }
}
