//! Route handlers organized by domain.

pub mod events;
pub mod health;
pub mod notification;
pub mod reminders;
