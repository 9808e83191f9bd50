//! Stakeholder resolution, mention parsing, templates, and the inbox service.

pub mod mentions;
pub mod rules;
pub mod service;
pub mod templates;

pub use rules::StakeholderResolver;
pub use service::InboxService;
pub use templates::{NotificationTemplate, OutboundNotification, TemplateComposer};
