//! VisionCast domain types and pure logic.
//!
//! This crate holds everything the generation pipeline needs that does not
//! touch the network or the database: entity enums and their transition
//! rules, the usage-quota vocabulary, analytics phases and aggregation
//! windows, the simulated generation outcome, and the shared dashboard
//! fallback contract.

pub mod analytics;
pub mod creation;
pub mod dashboard;
pub mod error;
pub mod types;
pub mod usage;
