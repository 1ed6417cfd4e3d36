//! Integration tests for deferred-completion task scheduling and claims.

mod common;

use chrono::Utc;
use sqlx::PgPool;
use visioncast_db::models::generation_task::{STATE_CANCELLED, STATE_COMPLETED, STATE_PENDING};
use visioncast_db::repositories::{CreationRepo, GenerationTaskRepo};

// ---------------------------------------------------------------------------
// Test: a future task is not claimable; a due one is claimed exactly once
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn claim_respects_run_at_and_is_exclusive(pool: PgPool) {
    let user_id = common::insert_user(&pool, "tasks@test.local").await;
    let creation = CreationRepo::create(&pool, user_id, &common::image_request("Dusk"))
        .await
        .unwrap();

    // Scheduled an hour out: nothing is due.
    let future = GenerationTaskRepo::schedule(
        &pool,
        creation.id,
        user_id,
        Utc::now() + chrono::Duration::hours(1),
    )
    .await
    .unwrap();
    assert_eq!(future.state, STATE_PENDING);
    assert!(GenerationTaskRepo::claim_next_due(&pool).await.unwrap().is_none());

    // A due task is claimed once and only once.
    let due = GenerationTaskRepo::schedule(&pool, creation.id, user_id, Utc::now())
        .await
        .unwrap();
    let claimed = GenerationTaskRepo::claim_next_due(&pool)
        .await
        .unwrap()
        .expect("due task is claimable");
    assert_eq!(claimed.id, due.id);
    assert_eq!(claimed.attempts, 1);
    assert!(claimed.claimed_at.is_some());

    assert!(GenerationTaskRepo::claim_next_due(&pool).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Test: terminal transitions are recorded
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn complete_and_fail_record_terminal_state(pool: PgPool) {
    let user_id = common::insert_user(&pool, "terminal@test.local").await;
    let creation = CreationRepo::create(&pool, user_id, &common::image_request("Dusk"))
        .await
        .unwrap();

    let task = GenerationTaskRepo::schedule(&pool, creation.id, user_id, Utc::now())
        .await
        .unwrap();
    let claimed = GenerationTaskRepo::claim_next_due(&pool).await.unwrap().unwrap();
    assert_eq!(claimed.id, task.id);

    GenerationTaskRepo::complete(&pool, task.id).await.unwrap();

    let tasks = GenerationTaskRepo::find_by_creation(&pool, creation.id)
        .await
        .unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].state, STATE_COMPLETED);
    assert!(tasks[0].finished_at.is_some());
}

// ---------------------------------------------------------------------------
// Test: cancellation only reaches pending tasks
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn cancel_only_applies_to_pending(pool: PgPool) {
    let user_id = common::insert_user(&pool, "cancel@test.local").await;
    let creation = CreationRepo::create(&pool, user_id, &common::image_request("Dusk"))
        .await
        .unwrap();

    GenerationTaskRepo::schedule(
        &pool,
        creation.id,
        user_id,
        Utc::now() + chrono::Duration::hours(1),
    )
    .await
    .unwrap();

    assert!(GenerationTaskRepo::cancel_pending(&pool, creation.id).await.unwrap());

    let tasks = GenerationTaskRepo::find_by_creation(&pool, creation.id)
        .await
        .unwrap();
    assert_eq!(tasks[0].state, STATE_CANCELLED);

    // Cancelled tasks are never claimed, and a second cancel is a no-op.
    assert!(GenerationTaskRepo::claim_next_due(&pool).await.unwrap().is_none());
    assert!(!GenerationTaskRepo::cancel_pending(&pool, creation.id).await.unwrap());
}
