//! Domain-level error taxonomy.

use crate::types::DbId;

/// Errors raised by domain logic and surfaced through the API boundary.
///
/// The HTTP layer owns the mapping to status codes; this crate only names
/// the failure class.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A referenced entity does not exist.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// Input failed a domain validation rule.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The operation conflicts with current state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The caller is authenticated but not allowed to do this.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// An unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}
