pub mod analytics;
pub mod creation;
pub mod generation_task;
pub mod notification;
pub mod usage;
