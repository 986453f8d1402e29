//! Roster seed documents
//!
//! A seed is a JSON document listing schools, teachers, classes and
//! students. It is applied parents-first, so a teacher may reference any
//! school in the same document.
//!
//! ```json
//! {
//!   "schools":  [{ "id": 1, "name": "Riverside", "city": "Springfield", "state": "IL" }],
//!   "teachers": [{ "id": 1, "name": "Ms. Frizzle", "schoolId": 1 }],
//!   "classes":  [{ "id": 1, "name": "Science", "teacherId": 1 }],
//!   "students": [{ "id": 1, "name": "Arnold", "classId": 1 }]
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::entities::{Class, School, Student, Teacher};
use super::errors::{StorageError, StorageResult};
use super::traits::{RosterCounts, RosterStore};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSeed {
    #[serde(default)]
    pub schools: Vec<School>,
    #[serde(default)]
    pub teachers: Vec<Teacher>,
    #[serde(default)]
    pub classes: Vec<Class>,
    #[serde(default)]
    pub students: Vec<Student>,
}

impl RosterSeed {
    /// Read a seed document from disk
    pub fn load(path: &Path) -> StorageResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| StorageError::Seed {
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> StorageResult<Self> {
        serde_json::from_str(content).map_err(|e| StorageError::Seed {
            message: format!("invalid seed JSON: {e}"),
        })
    }

    /// Number of entities in the document
    pub fn counts(&self) -> RosterCounts {
        RosterCounts {
            schools: self.schools.len(),
            teachers: self.teachers.len(),
            classes: self.classes.len(),
            students: self.students.len(),
        }
    }

    /// Insert every entity into `store`, stopping at the first failure.
    ///
    /// Entities inserted before the failure stay in the store.
    pub async fn apply(&self, store: &dyn RosterStore) -> StorageResult<RosterCounts> {
        for school in &self.schools {
            store.insert_school(school.clone()).await.map_err(seed_error)?;
        }
        for teacher in &self.teachers {
            store.insert_teacher(teacher.clone()).await.map_err(seed_error)?;
        }
        for class in &self.classes {
            store.insert_class(class.clone()).await.map_err(seed_error)?;
        }
        for student in &self.students {
            store.insert_student(student.clone()).await.map_err(seed_error)?;
        }

        let counts = self.counts();
        info!(
            schools = counts.schools,
            teachers = counts.teachers,
            classes = counts.classes,
            students = counts.students,
            "seed applied"
        );
        Ok(counts)
    }
}

fn seed_error(e: StorageError) -> StorageError {
    StorageError::Seed {
        message: e.to_string(),
    }
}
