//! Scalar aliases shared across the workspace.

/// Primary-key type for every table (BIGSERIAL in Postgres).
pub type DbId = i64;

/// Instants are always stored and exchanged in UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
