//! Entry point for business code: resolve, compose, dispatch.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info_span};

use atelier_core::events::DomainEvent;
use atelier_service::{StakeholderResolver, TemplateComposer};

use crate::dispatcher::{DispatchMode, DispatchReport, FanOutDispatcher};

/// Turns domain events into delivered notifications.
///
/// Cloning is cheap; clones share the underlying services.
#[derive(Debug, Clone)]
pub struct Notifier {
    resolver: Arc<StakeholderResolver>,
    composer: Arc<TemplateComposer>,
    dispatcher: Arc<FanOutDispatcher>,
}

impl Notifier {
    /// Create a notifier.
    pub fn new(
        resolver: Arc<StakeholderResolver>,
        composer: Arc<TemplateComposer>,
        dispatcher: Arc<FanOutDispatcher>,
    ) -> Self {
        Self {
            resolver,
            composer,
            dispatcher,
        }
    }

    /// Resolve, compose, and dispatch `event`, waiting for every channel.
    pub async fn notify(&self, event: &DomainEvent) -> DispatchReport {
        let stakeholders = self.resolver.resolve(event).await;
        if stakeholders.is_empty() {
            debug!(event_id = %event.id, event = event.payload.name(), "No stakeholders, nothing to send");
            return DispatchReport::default();
        }
        let template = self.composer.compose(event).await;
        self.dispatcher
            .dispatch(&stakeholders, &template, DispatchMode::Full)
            .await
    }

    /// Fire-and-forget variant for request handlers.
    pub fn spawn(&self, event: DomainEvent) -> JoinHandle<DispatchReport> {
        let notifier = self.clone();
        let span = info_span!("notify", event_id = %event.id, event = event.payload.name());
        tokio::spawn(async move { notifier.notify(&event).await }.instrument(span))
    }
}
