//! The deferred-completion loop.
//!
//! Tasks are claimed one at a time via `GenerationTaskRepo::claim_next_due`
//! (`FOR UPDATE SKIP LOCKED` underneath), so multiple worker processes can
//! run against the same database without double-completing a creation.

use std::time::Duration;

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use visioncast_core::analytics::{AnalyticsPhase, ENTITY_TYPE_CREATION, EVENT_TYPE_CREATION};
use visioncast_core::creation::{self, CreationKind, CreationStatus, MODEL_COMPLETED};
use visioncast_db::models::analytics::NewAnalyticsEvent;
use visioncast_db::models::creation::{CompletedFile, Creation};
use visioncast_db::models::generation_task::GenerationTask;
use visioncast_db::models::notification::{
    KIND_GENERATION_COMPLETE, KIND_SYSTEM, PRIORITY_HIGH, PRIORITY_MEDIUM,
};
use visioncast_db::repositories::{
    AnalyticsRepo, CreationRepo, GenerationTaskRepo, NotificationRepo,
};

/// How often the loop polls for due tasks when idle.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// What happened to one claimed task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The creation was completed and the side effects were written.
    Completed,
    /// The creation was no longer waiting (deleted or already terminal);
    /// the task was closed without writing anything.
    Skipped,
    /// The completion could not be written; the creation was marked failed.
    Failed,
}

/// Run the completion loop until `cancel` is triggered.
///
/// Each tick drains every task that is currently due, then sleeps for
/// `poll_interval`.
pub async fn run(pool: PgPool, poll_interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        poll_interval_ms = poll_interval.as_millis() as u64,
        "Generation worker started"
    );

    let mut interval = tokio::time::interval(poll_interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Generation worker stopping");
                break;
            }
            _ = interval.tick() => {
                if let Err(e) = process_due_tasks(&pool).await {
                    tracing::error!(error = %e, "Generation tick failed");
                }
            }
        }
    }
}

/// Claim and process every task that is currently due.
///
/// Returns the number of tasks processed. Exposed so tests (and the API's
/// integration tests) can drive completions deterministically without the
/// poll loop.
pub async fn process_due_tasks(pool: &PgPool) -> Result<u32, sqlx::Error> {
    let mut processed = 0;
    while let Some(task) = GenerationTaskRepo::claim_next_due(pool).await? {
        process_task(pool, &task).await?;
        processed += 1;
    }
    Ok(processed)
}

/// Execute one claimed task to its terminal state.
pub async fn process_task(pool: &PgPool, task: &GenerationTask) -> Result<TaskOutcome, sqlx::Error> {
    let creation = match CreationRepo::find_by_id(pool, task.creation_id).await? {
        Some(c) => c,
        None => {
            // The creation row is gone; nothing to complete.
            tracing::warn!(
                task_id = task.id,
                creation_id = task.creation_id,
                "Task references a missing creation"
            );
            GenerationTaskRepo::fail(pool, task.id, "creation not found").await?;
            return Ok(TaskOutcome::Failed);
        }
    };

    if creation.status != CreationStatus::Generating.as_str() {
        // Deleted (or otherwise terminal) while the task was queued.
        tracing::debug!(
            task_id = task.id,
            creation_id = creation.id,
            status = %creation.status,
            "Creation no longer waiting, skipping completion"
        );
        GenerationTaskRepo::complete(pool, task.id).await?;
        return Ok(TaskOutcome::Skipped);
    }

    match write_completion(pool, task, &creation).await {
        Ok(()) => {
            GenerationTaskRepo::complete(pool, task.id).await?;
            tracing::info!(
                task_id = task.id,
                creation_id = creation.id,
                "Generation completed"
            );
            Ok(TaskOutcome::Completed)
        }
        Err(e) => {
            tracing::error!(
                task_id = task.id,
                creation_id = creation.id,
                error = %e,
                "Completion failed, marking creation failed"
            );
            record_failure(pool, task, &creation, &e).await?;
            Ok(TaskOutcome::Failed)
        }
    }
}

/// Simulate the generation run and write every success side effect.
async fn write_completion(
    pool: &PgPool,
    task: &GenerationTask,
    creation: &Creation,
) -> Result<(), sqlx::Error> {
    let outcome = creation::simulate_outcome(creation.size.as_deref());
    let file = CompletedFile {
        file_url: outcome.file_url,
        thumbnail_url: outcome.thumbnail_url,
        file_size_bytes: outcome.file_size_bytes,
        generation_time_secs: outcome.generation_time_secs,
        model: MODEL_COMPLETED.to_string(),
    };

    // Guarded on `status = 'generating'`: a concurrent delete between the
    // status check and this write simply turns the task into a no-op.
    if !CreationRepo::mark_completed(pool, creation.id, &file).await? {
        return Ok(());
    }

    AnalyticsRepo::insert(
        pool,
        &NewAnalyticsEvent {
            user_id: task.user_id,
            event_type: EVENT_TYPE_CREATION,
            entity_id: creation.id,
            entity_type: ENTITY_TYPE_CREATION,
            phase: AnalyticsPhase::Completed,
            metrics: serde_json::json!({
                "generation_time_secs": file.generation_time_secs,
                "file_size_bytes": file.file_size_bytes,
                "success": true,
            }),
        },
    )
    .await?;

    let kind = kind_of(creation);
    NotificationRepo::create(
        pool,
        task.user_id,
        KIND_GENERATION_COMPLETE,
        &format!("{} Generation Complete", kind.label()),
        &format!(
            "Your {} \"{}\" has been generated successfully!",
            kind.as_str(),
            creation.title
        ),
        &serde_json::json!({
            "creation_id": creation.id,
            "kind": kind.as_str(),
            "title": creation.title,
        }),
        PRIORITY_MEDIUM,
    )
    .await?;

    Ok(())
}

/// Best-effort failure bookkeeping after a completion write went wrong.
async fn record_failure(
    pool: &PgPool,
    task: &GenerationTask,
    creation: &Creation,
    error: &sqlx::Error,
) -> Result<(), sqlx::Error> {
    CreationRepo::mark_failed(pool, creation.id).await?;

    AnalyticsRepo::insert(
        pool,
        &NewAnalyticsEvent {
            user_id: task.user_id,
            event_type: EVENT_TYPE_CREATION,
            entity_id: creation.id,
            entity_type: ENTITY_TYPE_CREATION,
            phase: AnalyticsPhase::Failed,
            metrics: serde_json::json!({ "success": false }),
        },
    )
    .await?;

    let kind = kind_of(creation);
    NotificationRepo::create(
        pool,
        task.user_id,
        KIND_SYSTEM,
        "Generation Failed",
        &format!("Failed to generate your {}. Please try again.", kind.as_str()),
        &serde_json::json!({
            "creation_id": creation.id,
            "kind": kind.as_str(),
            "title": creation.title,
        }),
        PRIORITY_HIGH,
    )
    .await?;

    GenerationTaskRepo::fail(pool, task.id, &error.to_string()).await?;
    Ok(())
}

/// Parse the stored kind column, tolerating bad data as `Image`.
fn kind_of(creation: &Creation) -> CreationKind {
    CreationKind::parse(&creation.kind).unwrap_or(CreationKind::Image)
}
