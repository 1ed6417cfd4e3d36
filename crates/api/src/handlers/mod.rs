pub mod creation;
pub mod dashboard;
pub mod notification;
pub mod usage;
