//! roster - a small HTTP service over schools, teachers, classes and students
//!
//! - `storage`: the `RosterStore` trait with in-memory and SQLite backends
//! - `roster`: student records and the operations behind `/students`
//! - `http_server`: axum routes, JSON extraction and middleware
//! - `observability`: tracing setup and lifecycle events
//! - `cli`: `serve` and `check` commands

pub mod cli;
pub mod http_server;
pub mod observability;
pub mod roster;
pub mod storage;
