//! Token validation for the API boundary.
//!
//! Account provisioning and login live in a separate service; this crate
//! only validates the Bearer tokens that service issues.

pub mod jwt;
