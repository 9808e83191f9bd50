//! Notification domain entities.

pub mod kind;
pub mod model;

pub use kind::{NotificationType, RelatedEntityKind};
pub use model::{NewNotification, NotificationRecord, deep_link};
