//! Creation entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use visioncast_core::creation::CreationKind;
use visioncast_core::types::{DbId, Timestamp};

/// A row from the `creations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Creation {
    pub id: DbId,
    pub user_id: DbId,
    pub kind: String,
    pub title: String,
    pub description: Option<String>,
    pub prompt: String,
    pub style: Option<String>,
    pub size: Option<String>,
    pub duration_secs: Option<i32>,
    pub quality: Option<String>,
    pub status: String,
    pub file_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub file_size_bytes: Option<i64>,
    pub generation_time_secs: Option<f64>,
    pub model: String,
    pub is_public: bool,
    pub tags: Vec<String>,
    pub download_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Payload for `POST /creations`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCreation {
    pub kind: CreationKind,
    pub title: String,
    pub description: Option<String>,
    pub prompt: String,
    pub style: Option<String>,
    pub size: Option<String>,
    pub duration_secs: Option<i32>,
    pub quality: Option<String>,
}

/// Owner-editable fields for `PATCH /creations/{id}`.
///
/// This struct IS the allow-list: any other field in the request body is
/// silently ignored during deserialization rather than rejected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCreation {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_public: Option<bool>,
}

impl UpdateCreation {
    /// Whether the patch carries no applicable fields.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.tags.is_none()
            && self.is_public.is_none()
    }
}

/// Filters for the owner listing.
#[derive(Debug, Clone, Default)]
pub struct CreationFilter {
    pub kind: Option<CreationKind>,
    pub status: Option<visioncast_core::creation::CreationStatus>,
}

/// Filters for the anonymous public listing.
#[derive(Debug, Clone, Default)]
pub struct PublicFilter {
    pub kind: Option<CreationKind>,
    pub tag: Option<String>,
}

/// File metadata written when the deferred generation step succeeds.
#[derive(Debug, Clone)]
pub struct CompletedFile {
    pub file_url: String,
    pub thumbnail_url: String,
    pub file_size_bytes: i64,
    pub generation_time_secs: f64,
    pub model: String,
}

/// Per-user aggregate counts for the stats endpoint.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CreationStats {
    pub total: i64,
    pub images: i64,
    pub videos: i64,
    pub generating: i64,
    pub completed: i64,
    pub failed: i64,
    pub deleted: i64,
    pub public_count: i64,
    pub total_downloads: i64,
}
