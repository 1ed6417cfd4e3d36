//! Route definitions for the `/creations` resource.
//!
//! `/public` is the only anonymous endpoint; everything else requires
//! authentication.

use axum::routing::get;
use axum::Router;

use crate::handlers::creation;
use crate::state::AppState;

/// Routes mounted at `/creations`.
///
/// ```text
/// POST   /               -> create_creation
/// GET    /               -> list_creations
/// GET    /public         -> public_creations
/// GET    /stats          -> creation_stats
/// GET    /{id}           -> get_creation
/// PATCH  /{id}           -> update_creation
/// DELETE /{id}           -> delete_creation
/// GET    /{id}/download  -> download_creation
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(creation::list_creations).post(creation::create_creation),
        )
        .route("/public", get(creation::public_creations))
        .route("/stats", get(creation::creation_stats))
        .route(
            "/{id}",
            get(creation::get_creation)
                .patch(creation::update_creation)
                .delete(creation::delete_creation),
        )
        .route("/{id}/download", get(creation::download_creation))
}
