//! Shared fixtures for db integration tests.

use chrono::Utc;
use sqlx::PgPool;
use visioncast_core::creation::CreationKind;
use visioncast_core::types::DbId;
use visioncast_core::usage::period_window;
use visioncast_db::models::creation::NewCreation;
use visioncast_db::models::usage::{PeriodLimits, UsagePeriod};
use visioncast_db::repositories::UsageRepo;

/// Insert a bare user row and return its id.
pub async fn insert_user(pool: &PgPool, email: &str) -> DbId {
    sqlx::query_scalar("INSERT INTO users (email, display_name) VALUES ($1, $2) RETURNING id")
        .bind(email)
        .bind("Test User")
        .fetch_one(pool)
        .await
        .expect("insert user")
}

/// Provision a usage period covering now for the user.
pub async fn provision_current_period(
    pool: &PgPool,
    user_id: DbId,
    limits: PeriodLimits,
) -> UsagePeriod {
    let (start, end) = period_window(Utc::now());
    UsageRepo::provision(pool, user_id, start, end, limits)
        .await
        .expect("provision usage period")
}

/// A minimal image creation request.
pub fn image_request(title: &str) -> NewCreation {
    NewCreation {
        kind: CreationKind::Image,
        title: title.to_string(),
        description: None,
        prompt: "a lighthouse at dusk".to_string(),
        style: Some("photorealistic".to_string()),
        size: Some("512/512".to_string()),
        duration_secs: None,
        quality: Some("standard".to_string()),
    }
}
