//! Shared dashboard summary contract.
//!
//! The zeroed fallback shape lives here as one typed constant-like
//! constructor so every client renders the same defaults instead of
//! duplicating literals inline.

use serde::{Deserialize, Serialize};

use crate::usage::UsageKind;

/// Headline counters shown at the top of the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_creations: i64,
    pub total_posts: i64,
    pub total_views: i64,
    pub total_engagement: i64,
}

impl DashboardStats {
    /// All-zero stats, used when aggregation fails or no data exists.
    pub fn zeroed() -> Self {
        Self {
            total_creations: 0,
            total_posts: 0,
            total_views: 0,
            total_engagement: 0,
        }
    }
}

/// Used/limit counters for a single resource kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindUsage {
    pub used: i32,
    pub limit: i32,
}

/// Per-kind usage snapshot rendered by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSummary {
    pub images: KindUsage,
    pub videos: KindUsage,
    pub posts: KindUsage,
}

impl UsageSummary {
    /// Zero usage against the default limits; the fallback when the usage
    /// record is missing or the lookup fails.
    pub fn with_default_limits() -> Self {
        Self {
            images: KindUsage {
                used: 0,
                limit: UsageKind::Images.default_limit(),
            },
            videos: KindUsage {
                used: 0,
                limit: UsageKind::Videos.default_limit(),
            },
            posts: KindUsage {
                used: 0,
                limit: UsageKind::Posts.default_limit(),
            },
        }
    }
}
