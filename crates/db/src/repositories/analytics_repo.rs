//! Repository for the `analytics_events` table.
//!
//! Strictly append-only: there is deliberately no update method here. The
//! deferred completion appends a second event for its entity instead of
//! patching the first one.

use sqlx::PgPool;
use visioncast_core::types::{DbId, Timestamp};

use crate::models::analytics::{AggregateBucket, AnalyticsEvent, NewAnalyticsEvent};

/// Column list for `analytics_events` queries.
const COLUMNS: &str =
    "id, user_id, event_type, entity_id, entity_type, phase, metrics, created_at";

/// Provides append and aggregation operations for analytics events.
pub struct AnalyticsRepo;

impl AnalyticsRepo {
    /// Append one event.
    pub async fn insert(
        pool: &PgPool,
        input: &NewAnalyticsEvent,
    ) -> Result<AnalyticsEvent, sqlx::Error> {
        let query = format!(
            "INSERT INTO analytics_events \
                 (user_id, event_type, entity_id, entity_type, phase, metrics) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AnalyticsEvent>(&query)
            .bind(input.user_id)
            .bind(input.event_type)
            .bind(input.entity_id)
            .bind(input.entity_type)
            .bind(input.phase.as_str())
            .bind(&input.metrics)
            .fetch_one(pool)
            .await
    }

    /// All events recorded for one entity, oldest first.
    pub async fn list_for_entity(
        pool: &PgPool,
        entity_id: DbId,
        event_type: &str,
    ) -> Result<Vec<AnalyticsEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM analytics_events \
             WHERE entity_id = $1 AND event_type = $2 \
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, AnalyticsEvent>(&query)
            .bind(entity_id)
            .bind(event_type)
            .fetch_all(pool)
            .await
    }

    /// Per-phase aggregation for a user over a half-open `[start, end)`
    /// window: event counts plus summed generation time and file size.
    pub async fn aggregate(
        pool: &PgPool,
        user_id: DbId,
        event_type: &str,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<AggregateBucket>, sqlx::Error> {
        sqlx::query_as::<_, AggregateBucket>(
            "SELECT \
                 phase, \
                 COUNT(*) AS events, \
                 COALESCE(SUM((metrics->>'generation_time_secs')::DOUBLE PRECISION), 0) \
                     AS total_generation_time_secs, \
                 COALESCE(SUM((metrics->>'file_size_bytes')::BIGINT), 0)::BIGINT \
                     AS total_file_size_bytes \
             FROM analytics_events \
             WHERE user_id = $1 AND event_type = $2 \
               AND created_at >= $3 AND created_at < $4 \
             GROUP BY phase \
             ORDER BY phase",
        )
        .bind(user_id)
        .bind(event_type)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await
    }
}
