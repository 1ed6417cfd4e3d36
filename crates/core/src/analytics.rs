//! Analytics event vocabulary and aggregation windows.
//!
//! Generation analytics use a two-phase event model: a `started` event is
//! appended when the creation is persisted and a separate `completed` or
//! `failed` event when the deferred step finishes. Events are immutable;
//! aggregation joins them by entity id instead of patching fields in place.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Event type for the generation pipeline.
pub const EVENT_TYPE_CREATION: &str = "creation";

/// Entity type recorded on creation events.
pub const ENTITY_TYPE_CREATION: &str = "creation";

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// Which point in an entity's lifecycle an event marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyticsPhase {
    /// Generation was requested and the record persisted.
    Started,
    /// The deferred step finished successfully.
    Completed,
    /// The deferred step failed.
    Failed,
    /// The artifact was downloaded.
    Download,
}

impl AnalyticsPhase {
    /// Database string form.
    pub fn as_str(self) -> &'static str {
        match self {
            AnalyticsPhase::Started => "started",
            AnalyticsPhase::Completed => "completed",
            AnalyticsPhase::Failed => "failed",
            AnalyticsPhase::Download => "download",
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregation periods
// ---------------------------------------------------------------------------

/// Period presets accepted by the stats endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationPeriod {
    Daily,
    Weekly,
    Monthly,
}

impl AggregationPeriod {
    /// Parse from the API string form.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "daily" => Ok(AggregationPeriod::Daily),
            "weekly" => Ok(AggregationPeriod::Weekly),
            "monthly" => Ok(AggregationPeriod::Monthly),
            other => Err(CoreError::Validation(format!(
                "Invalid period '{other}'. Must be one of: daily, weekly, monthly"
            ))),
        }
    }

    /// The half-open `[start, end)` window ending at `now`.
    pub fn window(self, now: Timestamp) -> (Timestamp, Timestamp) {
        let days = match self {
            AggregationPeriod::Daily => 1,
            AggregationPeriod::Weekly => 7,
            AggregationPeriod::Monthly => 30,
        };
        (now - chrono::Duration::days(days), now)
    }
}

impl Default for AggregationPeriod {
    fn default() -> Self {
        AggregationPeriod::Monthly
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
