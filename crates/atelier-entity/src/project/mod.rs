//! Project, membership, and daily-log entities.

pub mod daily_log;
pub mod member;
pub mod model;

pub use daily_log::DailyLog;
pub use member::ProjectMember;
pub use model::{Project, ProjectStatus};
