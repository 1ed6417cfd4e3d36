//! Download guards: only completed creations are downloadable, and each
//! download bumps the counter and appends an analytics event.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json};
use sqlx::PgPool;
use visioncast_core::types::DbId;
use visioncast_db::models::usage::PeriodLimits;
use visioncast_worker::process_due_tasks;

async fn seed_creation(pool: &PgPool, user_id: DbId) -> DbId {
    let token = common::token_for(user_id);
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/creations", &token, common::image_body("Dusk")).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["creation"]["id"]
        .as_i64()
        .expect("id is numeric")
}

// ---------------------------------------------------------------------------
// Test: downloading a generating creation is a 400 and counts nothing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn download_requires_completed(pool: PgPool) {
    let owner = common::insert_user(&pool, "early@test.local").await;
    common::provision_current_period(&pool, owner, PeriodLimits::default()).await;
    let id = seed_creation(&pool, owner).await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(
        app,
        &format!("/api/v1/creations/{id}/download"),
        &common::token_for(owner),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["status"], "error");
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let count: i32 = sqlx::query_scalar("SELECT download_count FROM creations WHERE id = $1")
        .bind(id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

// ---------------------------------------------------------------------------
// Test: after the worker completes, the download succeeds with URL + filename
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn completed_download_returns_url_and_filename(pool: PgPool) {
    let owner = common::insert_user(&pool, "ready@test.local").await;
    common::provision_current_period(&pool, owner, PeriodLimits::default()).await;
    let id = seed_creation(&pool, owner).await;

    // The test config schedules with zero delay, so the task is due now.
    assert_eq!(process_due_tasks(&pool).await.unwrap(), 1);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(
        app,
        &format!("/api/v1/creations/{id}/download"),
        &common::token_for(owner),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "success");

    let url = json["data"]["download_url"].as_str().unwrap();
    assert!(url.starts_with("https://picsum.photos/"));
    // The placeholder URL has no extension, so the kind default applies.
    assert_eq!(json["data"]["filename"], "Dusk.jpg");

    let count: i32 = sqlx::query_scalar("SELECT download_count FROM creations WHERE id = $1")
        .bind(id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);

    let download_events: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM analytics_events WHERE entity_id = $1 AND phase = 'download'",
    )
    .bind(id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(download_events, 1);
}

// ---------------------------------------------------------------------------
// Test: a private creation's download is owner-only
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn private_download_requires_ownership(pool: PgPool) {
    let owner = common::insert_user(&pool, "keeper@test.local").await;
    let stranger = common::insert_user(&pool, "taker@test.local").await;
    common::provision_current_period(&pool, owner, PeriodLimits::default()).await;
    let id = seed_creation(&pool, owner).await;

    process_due_tasks(&pool).await.unwrap();

    let app = common::build_test_app(pool);
    let response = get_auth(
        app,
        &format!("/api/v1/creations/{id}/download"),
        &common::token_for(stranger),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
