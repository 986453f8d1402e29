//! Student transfer records and entity mapping
//!
//! The wire shape is flat: the class, teacher and school a student
//! belongs to are all carried as ids. Teacher and school ids are derived
//! on the server by walking Student → Class → Teacher → School.

use serde::{Deserialize, Serialize};

use crate::storage::{Class, RosterStore, Student};

use super::errors::{RosterError, RosterResult};

/// Student as sent to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: i32,
    pub name: String,
    pub class_id: i32,
    pub teacher_id: i32,
    pub school_id: i32,
}

/// Student as received from clients
///
/// Field names are matched against lowercased keys; decode through
/// [`CaseInsensitiveJson`](crate::http_server::CaseInsensitiveJson).
/// `teacherId` and `schoolId` are accepted and ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StudentPayload {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "classid")]
    pub class_id: i32,
}

impl StudentPayload {
    pub fn new(id: i32, name: impl Into<String>, class_id: i32) -> Self {
        Self {
            id,
            name: Some(name.into()),
            class_id,
        }
    }

    /// Name is absent, null or empty
    pub fn name_is_missing(&self) -> bool {
        self.name.as_deref().map_or(true, str::is_empty)
    }

    fn require_name(&self) -> RosterResult<&str> {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => Ok(name),
            _ => Err(RosterError::Validation("name is required".to_string())),
        }
    }
}

/// Project a stored student into its transfer record.
///
/// Each hop of the relationship chain is looked up separately; a missing
/// hop means the store lost referential integrity.
pub async fn to_record(student: &Student, store: &dyn RosterStore) -> RosterResult<StudentRecord> {
    let class = store.find_class(student.class_id).await?.ok_or_else(|| {
        RosterError::Inconsistent(format!(
            "student {} references missing class {}",
            student.id, student.class_id
        ))
    })?;
    let teacher = store.find_teacher(class.teacher_id).await?.ok_or_else(|| {
        RosterError::Inconsistent(format!(
            "class {} references missing teacher {}",
            class.id, class.teacher_id
        ))
    })?;
    let school = store.find_school(teacher.school_id).await?.ok_or_else(|| {
        RosterError::Inconsistent(format!(
            "teacher {} references missing school {}",
            teacher.id, teacher.school_id
        ))
    })?;

    Ok(StudentRecord {
        id: student.id,
        name: student.name.clone(),
        class_id: class.id,
        teacher_id: teacher.id,
        school_id: school.id,
    })
}

/// Build a new student bound to an already-resolved class.
pub fn to_entity(payload: &StudentPayload, class: &Class) -> RosterResult<Student> {
    if class.id != payload.class_id {
        return Err(RosterError::Contract(format!(
            "resolved class {} does not match requested class {}",
            class.id, payload.class_id
        )));
    }

    Ok(Student {
        id: payload.id,
        name: payload.require_name()?.to_string(),
        class_id: class.id,
    })
}

/// Overwrite name and class of `student` in place.
pub fn apply_update(student: &mut Student, payload: &StudentPayload, class: &Class) -> RosterResult<()> {
    if payload.id != student.id {
        return Err(RosterError::Contract(format!(
            "payload id {} does not match student {}",
            payload.id, student.id
        )));
    }
    if class.id != payload.class_id {
        return Err(RosterError::Contract(format!(
            "resolved class {} does not match requested class {}",
            class.id, payload.class_id
        )));
    }

    student.name = payload.require_name()?.to_string();
    student.class_id = class.id;
    Ok(())
}
