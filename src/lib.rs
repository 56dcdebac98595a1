// Root library of the `examplan` crate.
// Exam scheduling and conflict-resolution engine: batch assignment
// generation, conflict detection, greedy resolution and a validation gate
// over a SQLite store, fronted by a small JSON HTTP API.
pub mod error;
pub mod models;
pub mod scheduling;
pub mod server;
pub mod store;

/// Runs the HTTP server (re-export for easy use from `main`)
pub use server::run_server;
pub use error::ScheduleError;
