pub mod creation;
pub mod dashboard;
pub mod health;
pub mod notification;
pub mod usage;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /creations                         create (POST), owner list (GET)
/// /creations/public                  anonymous public listing
/// /creations/stats                   per-user stats + analytics
/// /creations/{id}                    get, update (PATCH), delete
/// /creations/{id}/download           download metadata
///
/// /usage/current                     current usage period
///
/// /notifications                     list
/// /notifications/read-all            mark all read (POST)
/// /notifications/unread-count        unread count
/// /notifications/{id}/read           mark read (POST)
///
/// /dashboard/summary                 composed dashboard payload
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/creations", creation::router())
        .nest("/usage", usage::router())
        .nest("/notifications", notification::router())
        .nest("/dashboard", dashboard::router())
}
