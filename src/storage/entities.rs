//! Persisted roster entities
//!
//! Relationships are held as parent ids. Back-collections
//! (a school's teachers, a class's students) are store queries,
//! see [`RosterStore`](super::RosterStore).

use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::{StorageError, StorageResult};

/// The four entity collections of the roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    School,
    Teacher,
    Class,
    Student,
}

impl Collection {
    /// Table name used by the relational backend
    pub fn table(&self) -> &'static str {
        match self {
            Collection::School => "schools",
            Collection::Teacher => "teachers",
            Collection::Class => "classes",
            Collection::Student => "students",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::School => "school",
            Collection::Teacher => "teacher",
            Collection::Class => "class",
            Collection::Student => "student",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct School {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: i32,
    pub name: String,
    pub school_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: i32,
    pub name: String,
    pub teacher_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i32,
    pub name: String,
    pub class_id: i32,
}

fn require(collection: Collection, id: i32, field: &str, value: &str) -> StorageResult<()> {
    if value.is_empty() {
        return Err(StorageError::InvalidEntity {
            collection,
            id,
            message: format!("{field} must not be empty"),
        });
    }
    Ok(())
}

impl School {
    /// Check required fields before persisting
    pub fn validate(&self) -> StorageResult<()> {
        require(Collection::School, self.id, "name", &self.name)?;
        require(Collection::School, self.id, "city", &self.city)?;
        require(Collection::School, self.id, "state", &self.state)
    }
}

impl Teacher {
    pub fn validate(&self) -> StorageResult<()> {
        require(Collection::Teacher, self.id, "name", &self.name)
    }
}

impl Class {
    pub fn validate(&self) -> StorageResult<()> {
        require(Collection::Class, self.id, "name", &self.name)
    }
}

impl Student {
    pub fn validate(&self) -> StorageResult<()> {
        require(Collection::Student, self.id, "name", &self.name)
    }
}
