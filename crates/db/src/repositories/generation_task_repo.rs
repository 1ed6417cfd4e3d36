//! Repository for the `generation_tasks` table.
//!
//! Tasks are claimed with `FOR UPDATE SKIP LOCKED`, so multiple worker
//! instances never double-run a completion and a claimed task makes exactly
//! one terminal transition.

use sqlx::PgPool;
use visioncast_core::types::{DbId, Timestamp};

use crate::models::generation_task::{
    GenerationTask, STATE_CANCELLED, STATE_COMPLETED, STATE_FAILED, STATE_PENDING, STATE_RUNNING,
};

/// Column list for `generation_tasks` queries.
const COLUMNS: &str = "\
    id, creation_id, user_id, state, run_at, attempts, last_error, \
    claimed_at, finished_at, created_at";

/// Provides scheduling and claim operations for deferred completions.
pub struct GenerationTaskRepo;

impl GenerationTaskRepo {
    /// Schedule a deferred completion to run at `run_at`.
    pub async fn schedule(
        pool: &PgPool,
        creation_id: DbId,
        user_id: DbId,
        run_at: Timestamp,
    ) -> Result<GenerationTask, sqlx::Error> {
        let query = format!(
            "INSERT INTO generation_tasks (creation_id, user_id, run_at) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GenerationTask>(&query)
            .bind(creation_id)
            .bind(user_id)
            .bind(run_at)
            .fetch_one(pool)
            .await
    }

    /// Atomically claim the next due pending task.
    ///
    /// Returns `None` when nothing is due yet.
    pub async fn claim_next_due(pool: &PgPool) -> Result<Option<GenerationTask>, sqlx::Error> {
        let query = format!(
            "UPDATE generation_tasks \
             SET state = $1, claimed_at = NOW(), attempts = attempts + 1 \
             WHERE id = ( \
                 SELECT id FROM generation_tasks \
                 WHERE state = $2 AND run_at <= NOW() \
                 ORDER BY run_at ASC \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GenerationTask>(&query)
            .bind(STATE_RUNNING)
            .bind(STATE_PENDING)
            .fetch_optional(pool)
            .await
    }

    /// Mark a claimed task as completed.
    pub async fn complete(pool: &PgPool, task_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE generation_tasks \
             SET state = $2, finished_at = NOW() \
             WHERE id = $1",
        )
        .bind(task_id)
        .bind(STATE_COMPLETED)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Mark a claimed task as failed with an error message.
    pub async fn fail(pool: &PgPool, task_id: DbId, error: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE generation_tasks \
             SET state = $2, last_error = $3, finished_at = NOW() \
             WHERE id = $1",
        )
        .bind(task_id)
        .bind(STATE_FAILED)
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Cancel the pending task for a creation, if any.
    ///
    /// Only pending tasks can be cancelled; a task the worker has already
    /// claimed runs to its terminal state.
    pub async fn cancel_pending(pool: &PgPool, creation_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE generation_tasks \
             SET state = $2, finished_at = NOW() \
             WHERE creation_id = $1 AND state = $3",
        )
        .bind(creation_id)
        .bind(STATE_CANCELLED)
        .bind(STATE_PENDING)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All tasks recorded for a creation, oldest first.
    pub async fn find_by_creation(
        pool: &PgPool,
        creation_id: DbId,
    ) -> Result<Vec<GenerationTask>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM generation_tasks \
             WHERE creation_id = $1 \
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, GenerationTask>(&query)
            .bind(creation_id)
            .fetch_all(pool)
            .await
    }
}
