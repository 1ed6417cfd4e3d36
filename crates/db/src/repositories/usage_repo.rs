//! Repository for the `usage_periods` table.
//!
//! The quota check and increment are a single atomic statement: the update
//! only matches when the counter is under its limit, so concurrent requests
//! from the same user cannot overrun the quota.

use sqlx::PgPool;
use visioncast_core::types::{DbId, Timestamp};
use visioncast_core::usage::UsageKind;

use crate::models::usage::{IncrementOutcome, PeriodLimits, UsagePeriod};

/// Column list for `usage_periods` queries.
const COLUMNS: &str = "\
    id, user_id, period_start, period_end, \
    images_used, images_limit, videos_used, videos_limit, \
    posts_used, posts_limit, created_at, updated_at";

/// Provides quota operations for usage periods.
pub struct UsageRepo;

impl UsageRepo {
    /// The usage period covering `now` for a user, if provisioned.
    pub async fn find_current(
        pool: &PgPool,
        user_id: DbId,
        now: Timestamp,
    ) -> Result<Option<UsagePeriod>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM usage_periods \
             WHERE user_id = $1 AND period_start <= $2 AND period_end > $2 \
             ORDER BY period_start DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, UsagePeriod>(&query)
            .bind(user_id)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Atomically increment a kind counter if and only if it is under its
    /// limit. There is no decrement path.
    ///
    /// The column names are derived from [`UsageKind`], never from request
    /// input.
    pub async fn try_increment(
        pool: &PgPool,
        user_id: DbId,
        kind: UsageKind,
        now: Timestamp,
    ) -> Result<IncrementOutcome, sqlx::Error> {
        let col = kind.as_str();
        let query = format!(
            "UPDATE usage_periods \
             SET {col}_used = {col}_used + 1, updated_at = NOW() \
             WHERE user_id = $1 \
               AND period_start <= $2 AND period_end > $2 \
               AND {col}_used < {col}_limit \
             RETURNING {COLUMNS}"
        );

        let updated = sqlx::query_as::<_, UsagePeriod>(&query)
            .bind(user_id)
            .bind(now)
            .fetch_optional(pool)
            .await?;

        match updated {
            Some(row) => Ok(IncrementOutcome::Incremented(row)),
            // Nothing matched: either the counter is capped or no period
            // covers this instant. Distinguish with a plain lookup.
            None => match Self::find_current(pool, user_id, now).await? {
                Some(_) => Ok(IncrementOutcome::LimitReached),
                None => Ok(IncrementOutcome::NoPeriod),
            },
        }
    }

    /// Provision a usage period. Called out-of-band at account/period
    /// creation; the pipeline itself never creates periods.
    pub async fn provision(
        pool: &PgPool,
        user_id: DbId,
        period_start: Timestamp,
        period_end: Timestamp,
        limits: PeriodLimits,
    ) -> Result<UsagePeriod, sqlx::Error> {
        let query = format!(
            "INSERT INTO usage_periods \
                 (user_id, period_start, period_end, images_limit, videos_limit, posts_limit) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UsagePeriod>(&query)
            .bind(user_id)
            .bind(period_start)
            .bind(period_end)
            .bind(limits.images)
            .bind(limits.videos)
            .bind(limits.posts)
            .fetch_one(pool)
            .await
    }
}
