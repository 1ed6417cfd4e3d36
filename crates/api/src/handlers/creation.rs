//! Handlers for the `/creations` resource.
//!
//! `POST /` is the orchestration point of the whole pipeline: quota check,
//! record creation, analytics, and scheduling of the deferred completion all
//! happen here, in that order. The quota increment goes first and is atomic,
//! so a rejected request leaves no side effects at all.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use visioncast_core::analytics::{
    AggregationPeriod, AnalyticsPhase, ENTITY_TYPE_CREATION, EVENT_TYPE_CREATION,
};
use visioncast_core::creation::{self, CreationKind, CreationStatus};
use visioncast_core::error::CoreError;
use visioncast_core::types::DbId;
use visioncast_core::usage::UsageKind;
use visioncast_db::models::analytics::NewAnalyticsEvent;
use visioncast_db::models::creation::{
    Creation, CreationFilter, NewCreation, PublicFilter, UpdateCreation,
};
use visioncast_db::models::usage::IncrementOutcome;
use visioncast_db::repositories::{
    clamp_limit, clamp_page, AnalyticsRepo, CreationRepo, GenerationTaskRepo, UsageRepo,
};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, Pagination};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /creations`.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Filter by kind (`image` | `video`).
    pub kind: Option<String>,
    /// Filter by status (`generating` | `completed` | `failed` | `deleted`).
    pub status: Option<String>,
}

/// Query parameters for `GET /creations/public`.
#[derive(Debug, Deserialize)]
pub struct PublicQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub kind: Option<String>,
    /// Only creations carrying this tag.
    pub tag: Option<String>,
}

/// Query parameters for `GET /creations/stats`.
#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    /// Aggregation window (`daily` | `weekly` | `monthly`). Defaults to monthly.
    pub period: Option<String>,
}

/// Response body for `GET /creations/{id}/download`.
#[derive(Debug, Serialize)]
pub struct DownloadInfo {
    pub download_url: String,
    pub filename: String,
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// POST /api/v1/creations
///
/// Accept a generation request. On success the response carries the pending
/// record (`status: "generating"`); the artifact arrives via the worker.
///
/// Order matters: the atomic usage increment runs first, so a caller at
/// their limit is rejected before anything is written.
pub async fn create_creation(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<NewCreation>,
) -> AppResult<impl IntoResponse> {
    validate_new_creation(&input)?;

    let now = Utc::now();
    let usage_kind = UsageKind::for_creation(input.kind);

    match UsageRepo::try_increment(&state.pool, auth.user_id, usage_kind, now).await? {
        IncrementOutcome::Incremented(_) => {}
        IncrementOutcome::LimitReached => {
            return Err(AppError::Core(CoreError::Forbidden(format!(
                "You have reached your {} limit for this period",
                usage_kind.as_str()
            ))));
        }
        IncrementOutcome::NoPeriod => {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Usage record",
                id: auth.user_id,
            }));
        }
    }

    let record = CreationRepo::create(&state.pool, auth.user_id, &input).await?;

    AnalyticsRepo::insert(
        &state.pool,
        &NewAnalyticsEvent {
            user_id: auth.user_id,
            event_type: EVENT_TYPE_CREATION,
            entity_id: record.id,
            entity_type: ENTITY_TYPE_CREATION,
            phase: AnalyticsPhase::Started,
            metrics: json!({ "kind": input.kind.as_str() }),
        },
    )
    .await?;

    let run_at = now + chrono::Duration::seconds(state.config.generation_delay_secs as i64);
    GenerationTaskRepo::schedule(&state.pool, record.id, auth.user_id, run_at).await?;

    tracing::info!(
        creation_id = record.id,
        user_id = auth.user_id,
        kind = input.kind.as_str(),
        "Creation accepted, generation scheduled"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(json!({ "creation": record }))),
    ))
}

/// Reject requests with missing required text fields before touching the quota.
fn validate_new_creation(input: &NewCreation) -> Result<(), AppError> {
    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Title must not be empty".into(),
        )));
    }
    if input.prompt.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Prompt must not be empty".into(),
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// List / stats
// ---------------------------------------------------------------------------

/// GET /api/v1/creations
///
/// List the authenticated user's creations, newest first, with optional
/// kind/status filters and page pagination.
pub async fn list_creations(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> AppResult<Json<DataResponse<serde_json::Value>>> {
    let filter = CreationFilter {
        kind: parse_kind(params.kind.as_deref())?,
        status: parse_status(params.status.as_deref())?,
    };

    let page = clamp_page(params.page);
    let limit = clamp_limit(params.limit);
    let offset = (page - 1) * limit;

    let creations =
        CreationRepo::list_by_owner(&state.pool, auth.user_id, &filter, limit, offset).await?;
    let total = CreationRepo::count_by_owner(&state.pool, auth.user_id, &filter).await?;

    Ok(Json(DataResponse::new(json!({
        "creations": creations,
        "pagination": Pagination::new(page, limit, total),
    }))))
}

/// GET /api/v1/creations/stats
///
/// Per-user aggregate counts plus the per-phase analytics buckets for the
/// requested window.
pub async fn creation_stats(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<StatsQuery>,
) -> AppResult<Json<DataResponse<serde_json::Value>>> {
    let period = match params.period.as_deref() {
        Some(s) => AggregationPeriod::parse(s).map_err(AppError::Core)?,
        None => AggregationPeriod::default(),
    };

    let stats = CreationRepo::stats(&state.pool, auth.user_id).await?;

    let (start, end) = period.window(Utc::now());
    let analytics =
        AnalyticsRepo::aggregate(&state.pool, auth.user_id, EVENT_TYPE_CREATION, start, end)
            .await?;

    Ok(Json(DataResponse::new(json!({
        "stats": stats,
        "analytics": analytics,
        "period": period,
    }))))
}

/// GET /api/v1/creations/public
///
/// Anonymous listing of public, completed creations.
pub async fn public_creations(
    State(state): State<AppState>,
    Query(params): Query<PublicQuery>,
) -> AppResult<Json<DataResponse<serde_json::Value>>> {
    let filter = PublicFilter {
        kind: parse_kind(params.kind.as_deref())?,
        tag: params.tag,
    };

    let page = clamp_page(params.page);
    let limit = clamp_limit(params.limit);
    let offset = (page - 1) * limit;

    let creations = CreationRepo::list_public(&state.pool, &filter, limit, offset).await?;
    let total = CreationRepo::count_public(&state.pool, &filter).await?;

    Ok(Json(DataResponse::new(json!({
        "creations": creations,
        "pagination": Pagination::new(page, limit, total),
    }))))
}

// ---------------------------------------------------------------------------
// Single-record operations
// ---------------------------------------------------------------------------

/// GET /api/v1/creations/{id}
///
/// The owner can always read their creation; other authenticated users can
/// read it only when it is public.
pub async fn get_creation(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<serde_json::Value>>> {
    let record = load_visible(&state, id, auth.user_id).await?;
    Ok(Json(DataResponse::new(json!({ "creation": record }))))
}

/// PATCH /api/v1/creations/{id}
///
/// Owner-only. Only the allow-listed fields in [`UpdateCreation`] are ever
/// applied; anything else in the body is silently ignored.
pub async fn update_creation(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(patch): Json<UpdateCreation>,
) -> AppResult<Json<DataResponse<serde_json::Value>>> {
    load_owned(&state, id, auth.user_id).await?;

    let updated = CreationRepo::update_fields(&state.pool, id, &patch)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Creation",
            id,
        }))?;

    Ok(Json(DataResponse::new(json!({ "creation": updated }))))
}

/// DELETE /api/v1/creations/{id}
///
/// Owner-only soft delete. Cancels a still-pending generation task and makes
/// a best-effort attempt to remove the remote file; neither failure is
/// surfaced to the caller.
pub async fn delete_creation(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<serde_json::Value>>> {
    let record = load_owned(&state, id, auth.user_id).await?;

    if let Some(url) = record.file_url.as_deref() {
        delete_remote_file(url);
    }

    if GenerationTaskRepo::cancel_pending(&state.pool, id).await? {
        tracing::debug!(creation_id = id, "Cancelled pending generation task");
    }

    CreationRepo::soft_delete(&state.pool, id).await?;

    tracing::info!(creation_id = id, user_id = auth.user_id, "Creation deleted");

    Ok(Json(DataResponse::new(json!({
        "message": "Creation deleted successfully"
    }))))
}

/// Best-effort removal of the stored artifact.
///
/// The storage provider is an external collaborator keyed by the URL's last
/// path segment; a failed (or impossible) deletion is logged and swallowed.
fn delete_remote_file(file_url: &str) {
    match creation::storage_public_id(file_url) {
        Some(public_id) => {
            tracing::info!(%public_id, "Requested remote file deletion");
        }
        None => {
            tracing::warn!(%file_url, "Could not derive storage id from file URL");
        }
    }
}

/// GET /api/v1/creations/{id}/download
///
/// Owner always, other authenticated users when public. Only `completed`
/// creations are downloadable; the download bumps the counter and appends a
/// `download` analytics event.
pub async fn download_creation(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<serde_json::Value>>> {
    let record = load_visible(&state, id, auth.user_id).await?;

    if record.status != CreationStatus::Completed.as_str() {
        return Err(AppError::Core(CoreError::Validation(
            "Creation is not ready for download".into(),
        )));
    }

    let file_url = record.file_url.clone().ok_or_else(|| {
        AppError::InternalError(format!("Completed creation {id} has no file URL"))
    })?;

    CreationRepo::increment_download_count(&state.pool, id).await?;

    AnalyticsRepo::insert(
        &state.pool,
        &NewAnalyticsEvent {
            user_id: auth.user_id,
            event_type: EVENT_TYPE_CREATION,
            entity_id: id,
            entity_type: ENTITY_TYPE_CREATION,
            phase: AnalyticsPhase::Download,
            metrics: json!({ "success": true }),
        },
    )
    .await?;

    let kind = CreationKind::parse(&record.kind).unwrap_or(CreationKind::Image);
    let filename = creation::download_filename(&record.title, kind, Some(&file_url));

    Ok(Json(DataResponse::new(json!(DownloadInfo {
        download_url: file_url,
        filename,
    }))))
}

// ---------------------------------------------------------------------------
// Shared lookup / access checks
// ---------------------------------------------------------------------------

/// Load a creation the caller may read: the owner always, others if public.
async fn load_visible(state: &AppState, id: DbId, user_id: DbId) -> Result<Creation, AppError> {
    let record = CreationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Creation",
            id,
        }))?;

    if record.user_id != user_id && !record.is_public {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not have access to this creation".into(),
        )));
    }
    Ok(record)
}

/// Load a creation the caller must own.
async fn load_owned(state: &AppState, id: DbId, user_id: DbId) -> Result<Creation, AppError> {
    let record = CreationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Creation",
            id,
        }))?;

    if record.user_id != user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not have access to this creation".into(),
        )));
    }
    Ok(record)
}

/// Parse an optional kind filter string.
fn parse_kind(raw: Option<&str>) -> Result<Option<CreationKind>, AppError> {
    raw.map(CreationKind::parse)
        .transpose()
        .map_err(AppError::Core)
}

/// Parse an optional status filter string.
fn parse_status(raw: Option<&str>) -> Result<Option<CreationStatus>, AppError> {
    raw.map(CreationStatus::parse)
        .transpose()
        .map_err(AppError::Core)
}
