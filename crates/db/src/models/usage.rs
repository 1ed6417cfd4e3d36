//! Usage period models.

use serde::Serialize;
use sqlx::FromRow;
use visioncast_core::types::{DbId, Timestamp};

/// A row from the `usage_periods` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UsagePeriod {
    pub id: DbId,
    pub user_id: DbId,
    pub period_start: Timestamp,
    pub period_end: Timestamp,
    pub images_used: i32,
    pub images_limit: i32,
    pub videos_used: i32,
    pub videos_limit: i32,
    pub posts_used: i32,
    pub posts_limit: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Per-kind limits used when provisioning a period.
#[derive(Debug, Clone, Copy)]
pub struct PeriodLimits {
    pub images: i32,
    pub videos: i32,
    pub posts: i32,
}

impl Default for PeriodLimits {
    fn default() -> Self {
        use visioncast_core::usage::UsageKind;
        Self {
            images: UsageKind::Images.default_limit(),
            videos: UsageKind::Videos.default_limit(),
            posts: UsageKind::Posts.default_limit(),
        }
    }
}

/// Result of the atomic conditional usage increment.
#[derive(Debug)]
pub enum IncrementOutcome {
    /// The counter was bumped; carries the updated row.
    Incremented(UsagePeriod),
    /// The counter is at or over its limit; nothing changed.
    LimitReached,
    /// No usage period covers the requested instant.
    NoPeriod,
}
