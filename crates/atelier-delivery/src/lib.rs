//! # atelier-delivery
//!
//! Delivery of notifications to recipients:
//!
//! - [`ChannelSender`] implementations for the in-app inbox, the push
//!   gateway, and the external messaging gateway
//! - [`FanOutDispatcher`], which drives every recipient through every
//!   channel with failures isolated per channel
//! - [`Notifier`], the entry point business code hands domain events to

pub mod channel;
pub mod dispatcher;
pub mod notifier;

pub use channel::{ChannelSender, DeliveryChannel, InAppChannel, MessagingChannel, PushChannel, Recipient};
pub use dispatcher::{ChannelTally, DispatchMode, DispatchReport, FanOutDispatcher};
pub use notifier::Notifier;
