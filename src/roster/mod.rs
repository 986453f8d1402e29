//! # Roster
//!
//! Student request handling on top of the storage layer: input
//! validation, relationship resolution and projection to the flat
//! transfer record.

pub mod errors;
pub mod record;
pub mod students;

pub use errors::{ErrorResponse, RosterError, RosterResult};
pub use record::{apply_update, to_entity, to_record, StudentPayload, StudentRecord};
pub use students::StudentsHandler;
