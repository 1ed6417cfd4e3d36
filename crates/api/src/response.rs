//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "status": "success", "data": ... }` envelope.
//! Use [`DataResponse`] instead of ad-hoc `serde_json::json!` blobs to get
//! compile-time type safety and consistent serialization.

use serde::Serialize;

/// Standard `{ "status": "success", "data": T }` response envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(DataResponse::new(items)))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub status: &'static str,
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            status: "success",
            data,
        }
    }
}

/// Page metadata attached to list responses.
#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    /// Compute page count from a total; zero rows means zero pages.
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let pages = if total == 0 {
            0
        } else {
            (total + limit - 1) / limit
        };
        Self {
            page,
            limit,
            total,
            pages,
        }
    }
}
