//! Usage-quota vocabulary and billing-period windows.

use chrono::{Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::creation::CreationKind;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Resource kinds
// ---------------------------------------------------------------------------

/// Resource kinds counted against a usage period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageKind {
    Images,
    Videos,
    Posts,
}

impl UsageKind {
    /// API string form.
    pub fn as_str(self) -> &'static str {
        match self {
            UsageKind::Images => "images",
            UsageKind::Videos => "videos",
            UsageKind::Posts => "posts",
        }
    }

    /// The usage kind a creation of the given kind counts against.
    pub fn for_creation(kind: CreationKind) -> Self {
        match kind {
            CreationKind::Image => UsageKind::Images,
            CreationKind::Video => UsageKind::Videos,
        }
    }

    /// Default per-period limit for newly provisioned accounts.
    pub fn default_limit(self) -> i32 {
        match self {
            UsageKind::Images => 10,
            UsageKind::Videos => 3,
            UsageKind::Posts => 20,
        }
    }
}

// ---------------------------------------------------------------------------
// Billing period windows
// ---------------------------------------------------------------------------

/// The calendar-month window containing `now`.
///
/// Periods are half-open: `[start, end)`, where `start` is midnight UTC on
/// the first of the month and `end` is midnight UTC on the first of the next.
pub fn period_window(now: Timestamp) -> (Timestamp, Timestamp) {
    let start = Utc
        .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .expect("first of month is always a valid timestamp");

    let (next_year, next_month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };
    let end = Utc
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .single()
        .expect("first of month is always a valid timestamp");

    (start, end)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
