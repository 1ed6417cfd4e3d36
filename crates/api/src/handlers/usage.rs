//! Handlers for the `/usage` resource.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde_json::json;
use visioncast_core::error::CoreError;
use visioncast_db::repositories::UsageRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/usage/current
///
/// The usage period covering now. 404 when the account has no provisioned
/// period; provisioning happens out-of-band at the account service.
pub async fn current_usage(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<serde_json::Value>>> {
    let period = UsageRepo::find_current(&state.pool, auth.user_id, Utc::now())
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Usage record",
            id: auth.user_id,
        }))?;

    Ok(Json(DataResponse::new(json!({ "usage": period }))))
}
