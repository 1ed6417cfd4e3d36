pub mod analytics_repo;
pub mod creation_repo;
pub mod generation_task_repo;
pub mod notification_repo;
pub mod usage_repo;

pub use analytics_repo::AnalyticsRepo;
pub use creation_repo::{clamp_limit, clamp_page, CreationRepo};
pub use generation_task_repo::GenerationTaskRepo;
pub use notification_repo::NotificationRepo;
pub use usage_repo::UsageRepo;
