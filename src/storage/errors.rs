//! Storage error types
//!
//! Every variant names the collection and key it concerns so the
//! request layer can translate it without re-querying the store.

use thiserror::Error;

use super::entities::Collection;

/// Storage-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// No entity with this key
    #[error("{collection} {id} not found")]
    NotFound { collection: Collection, id: i32 },

    /// Key already taken in this collection
    #[error("{collection} {id} already exists")]
    DuplicateKey { collection: Collection, id: i32 },

    /// Referenced parent does not exist
    #[error("{collection} {id} references missing {parent} {parent_id}")]
    MissingParent {
        collection: Collection,
        id: i32,
        parent: Collection,
        parent_id: i32,
    },

    /// Delete refused while children still reference the entity
    #[error("{collection} {id} still has {count} {dependent} record(s)")]
    HasDependents {
        collection: Collection,
        id: i32,
        dependent: Collection,
        count: usize,
    },

    /// Required field missing or empty
    #[error("invalid {collection} {id}: {message}")]
    InvalidEntity {
        collection: Collection,
        id: i32,
        message: String,
    },

    /// Backend could not be reached or opened
    #[error("storage connection error: {message}")]
    Connection { message: String },

    /// Backend rejected or failed a statement
    #[error("storage query error: {message}")]
    Query { message: String },

    /// Seed document could not be read or applied
    #[error("seed error: {message}")]
    Seed { message: String },
}

impl StorageError {
    pub fn not_found(collection: Collection, id: i32) -> Self {
        Self::NotFound { collection, id }
    }

    pub fn duplicate(collection: Collection, id: i32) -> Self {
        Self::DuplicateKey { collection, id }
    }

    pub fn missing_parent(collection: Collection, id: i32, parent: Collection, parent_id: i32) -> Self {
        Self::MissingParent {
            collection,
            id,
            parent,
            parent_id,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
