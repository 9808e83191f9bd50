//! # atelier-service
//!
//! Notification business logic. The stakeholder resolver decides who hears
//! about a domain event, the template composer decides what they read, and
//! the inbox service serves a user's own records.
//!
//! Services follow constructor injection: stores arrive as `Arc<dyn ...>`
//! trait objects at construction time.

pub mod context;
pub mod notification;

pub use context::RequestContext;
pub use notification::{
    InboxService, NotificationTemplate, OutboundNotification, StakeholderResolver,
    TemplateComposer,
};
