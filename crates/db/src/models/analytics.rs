//! Analytics event models.

use serde::Serialize;
use sqlx::FromRow;
use visioncast_core::analytics::AnalyticsPhase;
use visioncast_core::types::{DbId, Timestamp};

/// A row from the `analytics_events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AnalyticsEvent {
    pub id: DbId,
    pub user_id: DbId,
    pub event_type: String,
    pub entity_id: DbId,
    pub entity_type: String,
    pub phase: String,
    pub metrics: serde_json::Value,
    pub created_at: Timestamp,
}

/// Input for appending an event.
#[derive(Debug, Clone)]
pub struct NewAnalyticsEvent {
    pub user_id: DbId,
    pub event_type: &'static str,
    pub entity_id: DbId,
    pub entity_type: &'static str,
    pub phase: AnalyticsPhase,
    pub metrics: serde_json::Value,
}

/// One per-phase aggregation bucket for a user and period window.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AggregateBucket {
    pub phase: String,
    pub events: i64,
    pub total_generation_time_secs: f64,
    pub total_file_size_bytes: i64,
}
