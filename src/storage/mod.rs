//! Storage subsystem for the roster
//!
//! Holds the four roster collections behind the [`RosterStore`] trait.
//!
//! # Invariants Enforced
//!
//! - Keys are caller-assigned and unique per collection
//! - Every teacher, class and student references an existing parent
//! - Required text fields are never empty
//! - A parent with children cannot be deleted
//!
//! # Backends
//!
//! - [`MemoryStore`]: process-local tables, used by tests and the default config
//! - [`SqliteStore`]: SQLite through `sqlx`, durable when given a file URL

mod entities;
mod errors;
mod memory;
mod seed;
mod sqlite;
mod traits;

pub use entities::{Class, Collection, School, Student, Teacher};
pub use errors::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use seed::RosterSeed;
pub use sqlite::{SqliteConfig, SqliteStore};
pub use traits::{RosterCounts, RosterStore};

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Which backend to open
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    #[default]
    Memory,
    Sqlite(SqliteConfig),
}

impl StorageConfig {
    /// Open the configured backend as a shared store handle
    pub async fn open(&self) -> StorageResult<Arc<dyn RosterStore>> {
        match self {
            StorageConfig::Memory => Ok(MemoryStore::new_shared()),
            StorageConfig::Sqlite(config) => Ok(Arc::new(SqliteStore::connect(config).await?)),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            StorageConfig::Memory => "memory",
            StorageConfig::Sqlite(_) => "sqlite",
        }
    }
}
