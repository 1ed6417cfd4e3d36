//! Handler for the dashboard summary.
//!
//! The summary is composed from three independent lookups. Each one that
//! fails is replaced by the typed fallback from `visioncast_core::dashboard`
//! (zeroed stats, empty recents, default limits) so a degraded database
//! never takes the whole dashboard down with it.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use visioncast_core::dashboard::{DashboardStats, KindUsage, UsageSummary};
use visioncast_db::models::creation::Creation;
use visioncast_db::models::usage::UsagePeriod;
use visioncast_db::repositories::{CreationRepo, UsageRepo};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// How many recent creations the dashboard shows.
const RECENT_LIMIT: i64 = 5;

/// Composed payload for `GET /dashboard/summary`.
#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub stats: DashboardStats,
    pub recent_creations: Vec<Creation>,
    pub usage: UsageSummary,
}

/// GET /api/v1/dashboard/summary
pub async fn summary(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<DashboardSummary>>> {
    let now = Utc::now();

    let usage_period = match UsageRepo::find_current(&state.pool, auth.user_id, now).await {
        Ok(period) => period,
        Err(e) => {
            tracing::warn!(error = %e, user_id = auth.user_id, "Usage lookup failed, using fallback");
            None
        }
    };

    let stats = match CreationRepo::stats(&state.pool, auth.user_id).await {
        Ok(s) => DashboardStats {
            total_creations: s.total,
            total_posts: usage_period.as_ref().map_or(0, |p| p.posts_used as i64),
            total_views: s.total_downloads,
            total_engagement: s.total_downloads + s.public_count,
        },
        Err(e) => {
            tracing::warn!(error = %e, user_id = auth.user_id, "Stats lookup failed, using fallback");
            DashboardStats::zeroed()
        }
    };

    let recent_creations =
        match CreationRepo::recent_for_dashboard(&state.pool, auth.user_id, RECENT_LIMIT).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(error = %e, user_id = auth.user_id, "Recents lookup failed, using fallback");
                Vec::new()
            }
        };

    let usage = match usage_period {
        Some(period) => usage_from_period(&period),
        None => UsageSummary::with_default_limits(),
    };

    Ok(Json(DataResponse::new(DashboardSummary {
        stats,
        recent_creations,
        usage,
    })))
}

/// Project a usage period row onto the dashboard's used/limit shape.
fn usage_from_period(period: &UsagePeriod) -> UsageSummary {
    UsageSummary {
        images: KindUsage {
            used: period.images_used,
            limit: period.images_limit,
        },
        videos: KindUsage {
            used: period.videos_used,
            limit: period.videos_limit,
        },
        posts: KindUsage {
            used: period.posts_used,
            limit: period.posts_limit,
        },
    }
}
