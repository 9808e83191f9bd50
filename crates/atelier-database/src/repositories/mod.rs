//! PostgreSQL implementations of the store traits.

pub mod directory;
pub mod notification;

pub use directory::DirectoryRepository;
pub use notification::NotificationRepository;
