//! Integration tests for the creation orchestration endpoint.
//!
//! `POST /api/v1/creations` must perform exactly one usage increment, one
//! record insert, one `started` analytics event, and one scheduled task —
//! and a quota rejection must perform none of them.

mod common;

use axum::http::StatusCode;
use chrono::Utc;
use common::{body_json, get_auth, post_json};
use sqlx::PgPool;
use visioncast_db::models::usage::PeriodLimits;
use visioncast_db::repositories::UsageRepo;

// ---------------------------------------------------------------------------
// Test: happy path returns 201 with the pending record and all side effects
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn create_returns_pending_record_with_side_effects(pool: PgPool) {
    let user_id = common::insert_user(&pool, "create@test.local").await;
    common::provision_current_period(&pool, user_id, PeriodLimits::default()).await;
    let token = common::token_for(user_id);

    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/creations", &token, common::image_body("Dusk")).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["status"], "success");

    let creation = &json["data"]["creation"];
    assert_eq!(creation["status"], "generating");
    assert_eq!(creation["model"], "VisionCast AI");
    assert!(creation["file_url"].is_null());
    let creation_id = creation["id"].as_i64().expect("id is numeric");

    // Usage was incremented exactly once.
    let usage = UsageRepo::find_current(&pool, user_id, Utc::now())
        .await
        .unwrap()
        .expect("period exists");
    assert_eq!(usage.images_used, 1);

    // A 'started' analytics event was appended.
    let phases: Vec<String> = sqlx::query_scalar(
        "SELECT phase FROM analytics_events WHERE entity_id = $1 ORDER BY created_at",
    )
    .bind(creation_id)
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(phases, vec!["started"]);

    // A generation task was scheduled.
    let tasks: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM generation_tasks WHERE creation_id = $1")
            .bind(creation_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(tasks, 1);
}

// ---------------------------------------------------------------------------
// Test: quota rejection is a 403 with zero side effects
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn quota_rejection_leaves_no_side_effects(pool: PgPool) {
    let user_id = common::insert_user(&pool, "capped@test.local").await;
    common::provision_current_period(
        &pool,
        user_id,
        PeriodLimits {
            images: 1,
            videos: 3,
            posts: 20,
        },
    )
    .await;
    let token = common::token_for(user_id);

    let app = common::build_test_app(pool.clone());
    let first = post_json(
        app.clone(),
        "/api/v1/creations",
        &token,
        common::image_body("First"),
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = post_json(app, "/api/v1/creations", &token, common::image_body("Second")).await;
    assert_eq!(second.status(), StatusCode::FORBIDDEN);
    let json = body_json(second).await;
    assert_eq!(json["status"], "error");
    assert_eq!(json["code"], "FORBIDDEN");

    // The rejected request wrote nothing at all.
    let usage = UsageRepo::find_current(&pool, user_id, Utc::now())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(usage.images_used, 1);

    let creations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM creations WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(creations, 1);

    let events: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM analytics_events WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(events, 1);

    let tasks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM generation_tasks WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(tasks, 1);
}

// ---------------------------------------------------------------------------
// Test: an unprovisioned account gets a 404
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_usage_period_is_404(pool: PgPool) {
    let user_id = common::insert_user(&pool, "noperiod@test.local").await;
    let token = common::token_for(user_id);

    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/creations", &token, common::image_body("Dusk")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Test: invalid input is rejected before touching the quota
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn empty_title_is_rejected_without_increment(pool: PgPool) {
    let user_id = common::insert_user(&pool, "invalid@test.local").await;
    common::provision_current_period(&pool, user_id, PeriodLimits::default()).await;
    let token = common::token_for(user_id);

    let mut body = common::image_body("");
    body["title"] = serde_json::json!("   ");

    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/creations", &token, body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let usage = UsageRepo::find_current(&pool, user_id, Utc::now())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(usage.images_used, 0);
}

// ---------------------------------------------------------------------------
// Test: unknown kind is a validation error
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_kind_is_rejected(pool: PgPool) {
    let user_id = common::insert_user(&pool, "badkind@test.local").await;
    common::provision_current_period(&pool, user_id, PeriodLimits::default()).await;
    let token = common::token_for(user_id);

    let mut body = common::image_body("Dusk");
    body["kind"] = serde_json::json!("audio");

    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/creations", &token, body).await;

    // Serde rejects the unknown enum variant during extraction.
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// ---------------------------------------------------------------------------
// Test: authentication is required
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn create_requires_authentication(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = common::send(
        app,
        axum::http::Method::POST,
        "/api/v1/creations",
        None,
        Some(common::image_body("Dusk")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Test: owner listing paginates and filters
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn listing_returns_envelope_with_pagination(pool: PgPool) {
    let user_id = common::insert_user(&pool, "list@test.local").await;
    common::provision_current_period(&pool, user_id, PeriodLimits::default()).await;
    let token = common::token_for(user_id);

    let app = common::build_test_app(pool);
    for title in ["A", "B", "C"] {
        let response = post_json(
            app.clone(),
            "/api/v1/creations",
            &token,
            common::image_body(title),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = get_auth(app, "/api/v1/creations?page=1&limit=2", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["data"]["creations"].as_array().unwrap().len(), 2);

    let pagination = &json["data"]["pagination"];
    assert_eq!(pagination["page"], 1);
    assert_eq!(pagination["limit"], 2);
    assert_eq!(pagination["total"], 3);
    assert_eq!(pagination["pages"], 2);
}
