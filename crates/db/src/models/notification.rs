//! Notification entity models.

use serde::Serialize;
use sqlx::FromRow;
use visioncast_core::types::{DbId, Timestamp};

/// Notification kind for a successful generation.
pub const KIND_GENERATION_COMPLETE: &str = "generation_complete";
/// Notification kind for system-originated messages (e.g. failures).
pub const KIND_SYSTEM: &str = "system";

/// Notification priorities.
pub const PRIORITY_LOW: &str = "low";
pub const PRIORITY_MEDIUM: &str = "medium";
pub const PRIORITY_HIGH: &str = "high";

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub data: serde_json::Value,
    pub priority: String,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
