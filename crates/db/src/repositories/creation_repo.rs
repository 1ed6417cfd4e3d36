//! Repository for the `creations` table.
//!
//! Status transitions are enforced at the query level: the terminal updates
//! (`mark_completed`, `mark_failed`) only match rows still in `generating`,
//! and the download counter only moves on `completed` rows.

use sqlx::PgPool;
use visioncast_core::creation::CreationStatus;
use visioncast_core::types::DbId;

use crate::models::creation::{
    CompletedFile, Creation, CreationFilter, CreationStats, NewCreation, PublicFilter,
    UpdateCreation,
};

/// Column list for `creations` queries.
const COLUMNS: &str = "\
    id, user_id, kind, title, description, prompt, style, size, duration_secs, \
    quality, status, file_url, thumbnail_url, file_size_bytes, \
    generation_time_secs, model, is_public, tags, download_count, \
    created_at, updated_at";

/// Maximum page size for listings.
pub const MAX_LIMIT: i64 = 100;

/// Default page size for listings.
pub const DEFAULT_LIMIT: i64 = 20;

/// Provides CRUD operations for creations.
pub struct CreationRepo;

impl CreationRepo {
    /// Persist a new creation. Status defaults to `generating` and the
    /// pending model name is applied by the schema default.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &NewCreation,
    ) -> Result<Creation, sqlx::Error> {
        let query = format!(
            "INSERT INTO creations \
                 (user_id, kind, title, description, prompt, style, size, \
                  duration_secs, quality) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Creation>(&query)
            .bind(user_id)
            .bind(input.kind.as_str())
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.prompt)
            .bind(&input.style)
            .bind(&input.size)
            .bind(input.duration_secs)
            .bind(&input.quality)
            .fetch_one(pool)
            .await
    }

    /// Find a creation by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Creation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM creations WHERE id = $1");
        sqlx::query_as::<_, Creation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's creations, newest first, with optional kind/status
    /// filters and limit/offset pagination.
    pub async fn list_by_owner(
        pool: &PgPool,
        user_id: DbId,
        filter: &CreationFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Creation>, sqlx::Error> {
        let (where_clause, bind_idx) = Self::owner_where(filter);
        let query = format!(
            "SELECT {COLUMNS} FROM creations \
             {where_clause} \
             ORDER BY created_at DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, Creation>(&query).bind(user_id);
        if let Some(kind) = filter.kind {
            q = q.bind(kind.as_str());
        }
        if let Some(status) = filter.status {
            q = q.bind(status.as_str());
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Total number of rows the owner listing would match.
    pub async fn count_by_owner(
        pool: &PgPool,
        user_id: DbId,
        filter: &CreationFilter,
    ) -> Result<i64, sqlx::Error> {
        let (where_clause, _) = Self::owner_where(filter);
        let query = format!("SELECT COUNT(*) FROM creations {where_clause}");

        let mut q = sqlx::query_scalar::<_, i64>(&query).bind(user_id);
        if let Some(kind) = filter.kind {
            q = q.bind(kind.as_str());
        }
        if let Some(status) = filter.status {
            q = q.bind(status.as_str());
        }
        q.fetch_one(pool).await
    }

    /// WHERE clause for the owner listing; returns the clause and the next
    /// free bind index.
    fn owner_where(filter: &CreationFilter) -> (String, u32) {
        let mut conditions = vec!["user_id = $1".to_string()];
        let mut bind_idx: u32 = 2;

        if filter.kind.is_some() {
            conditions.push(format!("kind = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.status.is_some() {
            conditions.push(format!("status = ${bind_idx}"));
            bind_idx += 1;
        }

        (format!("WHERE {}", conditions.join(" AND ")), bind_idx)
    }

    /// List public, completed creations, newest first.
    pub async fn list_public(
        pool: &PgPool,
        filter: &PublicFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Creation>, sqlx::Error> {
        let (where_clause, bind_idx) = Self::public_where(filter);
        let query = format!(
            "SELECT {COLUMNS} FROM creations \
             {where_clause} \
             ORDER BY created_at DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, Creation>(&query);
        if let Some(kind) = filter.kind {
            q = q.bind(kind.as_str());
        }
        if let Some(ref tag) = filter.tag {
            q = q.bind(tag);
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Total number of rows the public listing would match.
    pub async fn count_public(pool: &PgPool, filter: &PublicFilter) -> Result<i64, sqlx::Error> {
        let (where_clause, _) = Self::public_where(filter);
        let query = format!("SELECT COUNT(*) FROM creations {where_clause}");

        let mut q = sqlx::query_scalar::<_, i64>(&query);
        if let Some(kind) = filter.kind {
            q = q.bind(kind.as_str());
        }
        if let Some(ref tag) = filter.tag {
            q = q.bind(tag);
        }
        q.fetch_one(pool).await
    }

    /// WHERE clause for the public listing; returns the clause and the next
    /// free bind index.
    fn public_where(filter: &PublicFilter) -> (String, u32) {
        let mut conditions = vec!["is_public".to_string(), "status = 'completed'".to_string()];
        let mut bind_idx: u32 = 1;

        if filter.kind.is_some() {
            conditions.push(format!("kind = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.tag.is_some() {
            conditions.push(format!("${bind_idx} = ANY(tags)"));
            bind_idx += 1;
        }

        (format!("WHERE {}", conditions.join(" AND ")), bind_idx)
    }

    /// Apply an owner patch. Only the fields present in [`UpdateCreation`]
    /// are ever written; an empty patch reads the row back unchanged.
    pub async fn update_fields(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCreation,
    ) -> Result<Option<Creation>, sqlx::Error> {
        if input.is_empty() {
            return Self::find_by_id(pool, id).await;
        }

        let mut sets: Vec<String> = Vec::new();
        let mut bind_idx: u32 = 2;

        if input.title.is_some() {
            sets.push(format!("title = ${bind_idx}"));
            bind_idx += 1;
        }
        if input.description.is_some() {
            sets.push(format!("description = ${bind_idx}"));
            bind_idx += 1;
        }
        if input.tags.is_some() {
            sets.push(format!("tags = ${bind_idx}"));
            bind_idx += 1;
        }
        if input.is_public.is_some() {
            sets.push(format!("is_public = ${bind_idx}"));
        }
        sets.push("updated_at = NOW()".to_string());

        let query = format!(
            "UPDATE creations SET {} WHERE id = $1 RETURNING {COLUMNS}",
            sets.join(", "),
        );

        let mut q = sqlx::query_as::<_, Creation>(&query).bind(id);
        if let Some(ref title) = input.title {
            q = q.bind(title);
        }
        if let Some(ref description) = input.description {
            q = q.bind(description);
        }
        if let Some(ref tags) = input.tags {
            q = q.bind(tags);
        }
        if let Some(is_public) = input.is_public {
            q = q.bind(is_public);
        }
        q.fetch_optional(pool).await
    }

    /// Soft delete: mark the row `deleted` but retain it.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE creations SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(CreationStatus::Deleted.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Transition `generating -> completed` and attach file metadata.
    ///
    /// Returns `false` when the row is no longer in `generating` (already
    /// terminal or soft-deleted), in which case nothing is written.
    pub async fn mark_completed(
        pool: &PgPool,
        id: DbId,
        file: &CompletedFile,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE creations \
             SET status = $2, file_url = $3, thumbnail_url = $4, \
                 file_size_bytes = $5, generation_time_secs = $6, model = $7, \
                 updated_at = NOW() \
             WHERE id = $1 AND status = $8",
        )
        .bind(id)
        .bind(CreationStatus::Completed.as_str())
        .bind(&file.file_url)
        .bind(&file.thumbnail_url)
        .bind(file.file_size_bytes)
        .bind(file.generation_time_secs)
        .bind(&file.model)
        .bind(CreationStatus::Generating.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Transition `generating -> failed`.
    pub async fn mark_failed(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE creations SET status = $2, updated_at = NOW() \
             WHERE id = $1 AND status = $3",
        )
        .bind(id)
        .bind(CreationStatus::Failed.as_str())
        .bind(CreationStatus::Generating.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Bump the download counter. Only `completed` creations are
    /// downloadable, so other statuses leave the counter untouched.
    pub async fn increment_download_count(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE creations \
             SET download_count = download_count + 1, updated_at = NOW() \
             WHERE id = $1 AND status = $2",
        )
        .bind(id)
        .bind(CreationStatus::Completed.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Per-user aggregate counts. `total` excludes soft-deleted rows, which
    /// are reported separately.
    pub async fn stats(pool: &PgPool, user_id: DbId) -> Result<CreationStats, sqlx::Error> {
        sqlx::query_as::<_, CreationStats>(
            "SELECT \
                 COUNT(*) FILTER (WHERE status <> 'deleted') AS total, \
                 COUNT(*) FILTER (WHERE kind = 'image' AND status <> 'deleted') AS images, \
                 COUNT(*) FILTER (WHERE kind = 'video' AND status <> 'deleted') AS videos, \
                 COUNT(*) FILTER (WHERE status = 'generating') AS generating, \
                 COUNT(*) FILTER (WHERE status = 'completed') AS completed, \
                 COUNT(*) FILTER (WHERE status = 'failed') AS failed, \
                 COUNT(*) FILTER (WHERE status = 'deleted') AS deleted, \
                 COUNT(*) FILTER (WHERE is_public AND status = 'completed') AS public_count, \
                 COALESCE(SUM(download_count), 0)::BIGINT AS total_downloads \
             FROM creations WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Recent non-deleted creations for the dashboard.
    pub async fn recent_for_dashboard(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<Creation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM creations \
             WHERE user_id = $1 AND status <> $2 \
             ORDER BY created_at DESC \
             LIMIT $3"
        );
        sqlx::query_as::<_, Creation>(&query)
            .bind(user_id)
            .bind(CreationStatus::Deleted.as_str())
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}

/// Clamp a requested page size to `[1, MAX_LIMIT]`, defaulting when absent.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Clamp a requested page number to at least 1, defaulting when absent.
pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).max(1)
}
