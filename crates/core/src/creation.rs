//! Creation entity vocabulary, status transition rules, and the simulated
//! generation outcome that stands in for a real inference backend.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Kinds and statuses
// ---------------------------------------------------------------------------

/// What kind of artifact a creation produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreationKind {
    Image,
    Video,
}

impl CreationKind {
    /// Database/API string form.
    pub fn as_str(self) -> &'static str {
        match self {
            CreationKind::Image => "image",
            CreationKind::Video => "video",
        }
    }

    /// Parse from the API/database string form.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "image" => Ok(CreationKind::Image),
            "video" => Ok(CreationKind::Video),
            other => Err(CoreError::Validation(format!(
                "Invalid creation kind '{other}'. Must be one of: image, video"
            ))),
        }
    }

    /// Human-readable label used in notification titles.
    pub fn label(self) -> &'static str {
        match self {
            CreationKind::Image => "Image",
            CreationKind::Video => "Video",
        }
    }

    /// Default download extension when the stored URL carries none.
    pub fn default_extension(self) -> &'static str {
        match self {
            CreationKind::Image => "jpg",
            CreationKind::Video => "mp4",
        }
    }
}

/// Lifecycle status of a creation.
///
/// Legal transitions: `Generating -> Completed | Failed`, and any status
/// to `Deleted` (soft delete, the row is retained).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreationStatus {
    Generating,
    Completed,
    Failed,
    Deleted,
}

impl CreationStatus {
    /// Database/API string form.
    pub fn as_str(self) -> &'static str {
        match self {
            CreationStatus::Generating => "generating",
            CreationStatus::Completed => "completed",
            CreationStatus::Failed => "failed",
            CreationStatus::Deleted => "deleted",
        }
    }

    /// Parse from the API/database string form.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "generating" => Ok(CreationStatus::Generating),
            "completed" => Ok(CreationStatus::Completed),
            "failed" => Ok(CreationStatus::Failed),
            "deleted" => Ok(CreationStatus::Deleted),
            other => Err(CoreError::Validation(format!(
                "Invalid creation status '{other}'. \
                 Must be one of: generating, completed, failed, deleted"
            ))),
        }
    }

    /// Whether a transition from `self` to `to` is allowed.
    pub fn can_transition(self, to: CreationStatus) -> bool {
        match (self, to) {
            (_, CreationStatus::Deleted) => true,
            (CreationStatus::Generating, CreationStatus::Completed) => true,
            (CreationStatus::Generating, CreationStatus::Failed) => true,
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Generation defaults
// ---------------------------------------------------------------------------

/// Model name stamped on a creation when it is first persisted.
pub const MODEL_PENDING: &str = "VisionCast AI";
/// Model name stamped on a creation when the simulated generation completes.
pub const MODEL_COMPLETED: &str = "VisionCast AI Pro";

/// Size token used when the request does not specify one.
pub const DEFAULT_SIZE: &str = "1024/1024";

/// Fixed delay before the deferred completion runs.
pub const DEFAULT_GENERATION_DELAY_SECS: u64 = 3;

/// Simulated generation time range, in seconds.
pub const MIN_GENERATION_SECS: f64 = 1.0;
pub const MAX_GENERATION_SECS: f64 = 6.0;

/// Simulated output file size range, in bytes (1-6 MB).
pub const MIN_FILE_SIZE_BYTES: i64 = 1_000_000;
pub const MAX_FILE_SIZE_BYTES: i64 = 6_000_000;

// ---------------------------------------------------------------------------
// Simulated outcome
// ---------------------------------------------------------------------------

/// Synthetic result of a generation run.
#[derive(Debug, Clone)]
pub struct SimulatedOutcome {
    pub generation_time_secs: f64,
    pub file_url: String,
    pub thumbnail_url: String,
    pub file_size_bytes: i64,
}

/// Produce a synthetic success outcome for a creation.
///
/// The file URL points at a public test image service keyed by the requested
/// size token and the current timestamp, so repeated runs yield distinct URLs.
pub fn simulate_outcome(size: Option<&str>) -> SimulatedOutcome {
    let mut rng = rand::rng();
    let generation_time_secs = rng.random_range(MIN_GENERATION_SECS..MAX_GENERATION_SECS);
    let file_size_bytes = rng.random_range(MIN_FILE_SIZE_BYTES..MAX_FILE_SIZE_BYTES);

    let file_url = placeholder_file_url(size, chrono::Utc::now().timestamp_millis());

    SimulatedOutcome {
        generation_time_secs,
        thumbnail_url: file_url.clone(),
        file_url,
        file_size_bytes,
    }
}

/// Build the placeholder file URL for a given size token and timestamp.
pub fn placeholder_file_url(size: Option<&str>, timestamp_millis: i64) -> String {
    let size = match size {
        Some(s) if !s.is_empty() => s,
        _ => DEFAULT_SIZE,
    };
    format!("https://picsum.photos/{size}?random={timestamp_millis}")
}

// ---------------------------------------------------------------------------
// Download and storage helpers
// ---------------------------------------------------------------------------

/// Synthesize a download filename from the creation title and stored URL.
///
/// Uses the URL's extension when it has one, otherwise the kind default.
pub fn download_filename(title: &str, kind: CreationKind, file_url: Option<&str>) -> String {
    let ext = file_url
        .and_then(url_extension)
        .unwrap_or_else(|| kind.default_extension().to_string());
    format!("{title}.{ext}")
}

/// Extract a plausible file extension from a URL's last path segment.
fn url_extension(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next()?;
    let segment = path.rsplit('/').next()?;
    let (_, ext) = segment.rsplit_once('.')?;
    if !ext.is_empty() && ext.len() <= 4 && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(ext.to_ascii_lowercase())
    } else {
        None
    }
}

/// Derive the storage provider's object identifier from a stored file URL.
///
/// The provider keys objects by the last path segment without its extension.
/// Returns `None` for URLs with no path past the host.
pub fn storage_public_id(file_url: &str) -> Option<String> {
    let path = file_url.split(['?', '#']).next()?;
    let rest = path.split_once("://").map_or(path, |(_, r)| r);
    let (_, segment) = rest.trim_end_matches('/').rsplit_once('/')?;
    let id = segment.split('.').next()?;
    if id.is_empty() {
        return None;
    }
    Some(id.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
