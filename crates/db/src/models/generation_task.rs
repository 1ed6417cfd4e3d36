//! Persisted deferred-completion task models.

use serde::Serialize;
use sqlx::FromRow;
use visioncast_core::types::{DbId, Timestamp};

/// Task states. A task makes exactly one terminal transition out of
/// `running`; `cancelled` is only reachable from `pending`.
pub const STATE_PENDING: &str = "pending";
pub const STATE_RUNNING: &str = "running";
pub const STATE_COMPLETED: &str = "completed";
pub const STATE_FAILED: &str = "failed";
pub const STATE_CANCELLED: &str = "cancelled";

/// A row from the `generation_tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GenerationTask {
    pub id: DbId,
    pub creation_id: DbId,
    pub user_id: DbId,
    pub state: String,
    pub run_at: Timestamp,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub claimed_at: Option<Timestamp>,
    pub finished_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
