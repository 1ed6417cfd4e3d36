//! Background worker that executes deferred generation completions.
//!
//! The API schedules a `generation_tasks` row when a creation is accepted;
//! this crate polls for due tasks, simulates the generation run, and writes
//! the completion (file metadata, analytics event, notification) back.

pub mod generation;

pub use generation::{process_due_tasks, process_task, run, TaskOutcome};
