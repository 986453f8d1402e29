//! # Students Handler
//!
//! Validation and persistence for the `/students` resource. Every method is
//! one logical operation against the store: resolve, check, mutate, project.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::storage::{Collection, RosterStore, StorageError};

use super::errors::{RosterError, RosterResult};
use super::record::{apply_update, to_entity, to_record, StudentPayload, StudentRecord};

/// Student operations over a shared store handle
#[derive(Clone)]
pub struct StudentsHandler {
    store: Arc<dyn RosterStore>,
}

impl StudentsHandler {
    pub fn new(store: Arc<dyn RosterStore>) -> Self {
        Self { store }
    }

    /// All students in store order
    pub async fn list(&self) -> RosterResult<Vec<StudentRecord>> {
        let students = self.store.list_students().await?;
        let mut records = Vec::with_capacity(students.len());
        for student in &students {
            records.push(to_record(student, self.store.as_ref()).await?);
        }
        Ok(records)
    }

    pub async fn get(&self, id: i32) -> RosterResult<StudentRecord> {
        let student = self
            .store
            .find_student(id)
            .await?
            .ok_or(RosterError::StudentNotFound(id))?;
        to_record(&student, self.store.as_ref()).await
    }

    /// Create a student; the returned record carries the derived teacher and school ids
    #[instrument(skip(self, payload), fields(id = payload.id, class_id = payload.class_id))]
    pub async fn create(&self, payload: StudentPayload) -> RosterResult<StudentRecord> {
        if payload.name_is_missing() {
            return Err(RosterError::Validation("name is required".to_string()));
        }

        // A missing class is reported as not found, not as a validation error.
        let class = self
            .store
            .find_class(payload.class_id)
            .await?
            .ok_or(RosterError::ClassNotFound(payload.class_id))?;

        if self.store.find_student(payload.id).await?.is_some() {
            return Err(RosterError::DuplicateStudent(payload.id));
        }

        let student = to_entity(&payload, &class)?;
        self.store
            .insert_student(student.clone())
            .await
            .map_err(|e| match e {
                StorageError::DuplicateKey { id, .. } => RosterError::DuplicateStudent(id),
                StorageError::MissingParent {
                    parent: Collection::Class,
                    parent_id,
                    ..
                } => RosterError::ClassNotFound(parent_id),
                other => RosterError::Storage(other),
            })?;

        info!(student_id = student.id, "student created");
        to_record(&student, self.store.as_ref()).await
    }

    /// Rename and/or move the student at `id`
    #[instrument(skip(self, payload), fields(class_id = payload.class_id))]
    pub async fn update(&self, id: i32, payload: StudentPayload) -> RosterResult<()> {
        if payload.id != id {
            return Err(RosterError::Validation(format!(
                "body id {} does not match path id {id}",
                payload.id
            )));
        }
        if payload.name_is_missing() {
            return Err(RosterError::Validation("name is required".to_string()));
        }

        let mut student = self
            .store
            .find_student(id)
            .await?
            .ok_or(RosterError::StudentNotFound(id))?;

        // Always keyed by the requested class; unchanged means the current one.
        let class = self
            .store
            .find_class(payload.class_id)
            .await?
            .ok_or(RosterError::ClassNotFound(payload.class_id))?;

        apply_update(&mut student, &payload, &class)?;
        self.store
            .update_student(student)
            .await
            .map_err(|e| match e {
                StorageError::NotFound { id, .. } => RosterError::StudentNotFound(id),
                StorageError::MissingParent {
                    parent: Collection::Class,
                    parent_id,
                    ..
                } => RosterError::ClassNotFound(parent_id),
                other => RosterError::Storage(other),
            })?;

        info!(student_id = id, "student updated");
        Ok(())
    }

    /// Remove a student, returning the record it had before removal
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> RosterResult<StudentRecord> {
        let student = self
            .store
            .find_student(id)
            .await?
            .ok_or(RosterError::StudentNotFound(id))?;
        let record = to_record(&student, self.store.as_ref()).await?;

        self.store.delete_student(id).await.map_err(|e| match e {
            StorageError::NotFound { id, .. } => RosterError::StudentNotFound(id),
            other => RosterError::Storage(other),
        })?;

        info!(student_id = id, "student deleted");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::storage::{
        Class, MemoryStore, RosterCounts, School, Student, StorageResult, Teacher,
    };

    /// Two schools, one teacher and one class each; students 1 and 2 in class 1.
    async fn seeded_store() -> Arc<MemoryStore> {
        let store = MemoryStore::new_shared();
        for id in [1, 2] {
            store
                .insert_school(School {
                    id,
                    name: format!("School {id}"),
                    city: "Springfield".to_string(),
                    state: "IL".to_string(),
                })
                .await
                .unwrap();
            store
                .insert_teacher(Teacher {
                    id,
                    name: format!("Teacher {id}"),
                    school_id: id,
                })
                .await
                .unwrap();
            store
                .insert_class(Class {
                    id,
                    name: format!("Class {id}"),
                    teacher_id: id,
                })
                .await
                .unwrap();
        }
        for (id, name) in [(1, "Jim Bob"), (2, "Jane Doe")] {
            store
                .insert_student(Student {
                    id,
                    name: name.to_string(),
                    class_id: 1,
                })
                .await
                .unwrap();
        }
        store
    }

    async fn handler() -> StudentsHandler {
        StudentsHandler::new(seeded_store().await)
    }

    /// Answers lookups from a stale view while writes hit the real store,
    /// as when another request changes the store between resolve and write.
    struct StaleReads {
        inner: Arc<MemoryStore>,
        hidden_student: Option<i32>,
        phantom_student: Option<Student>,
        phantom_class: Option<Class>,
    }

    impl StaleReads {
        async fn new() -> Self {
            Self {
                inner: seeded_store().await,
                hidden_student: None,
                phantom_student: None,
                phantom_class: None,
            }
        }

        fn into_handler(self) -> StudentsHandler {
            StudentsHandler::new(Arc::new(self))
        }
    }

    #[async_trait]
    impl RosterStore for StaleReads {
        async fn insert_school(&self, school: School) -> StorageResult<()> {
            self.inner.insert_school(school).await
        }

        async fn find_school(&self, id: i32) -> StorageResult<Option<School>> {
            self.inner.find_school(id).await
        }

        async fn delete_school(&self, id: i32) -> StorageResult<School> {
            self.inner.delete_school(id).await
        }

        async fn insert_teacher(&self, teacher: Teacher) -> StorageResult<()> {
            self.inner.insert_teacher(teacher).await
        }

        async fn find_teacher(&self, id: i32) -> StorageResult<Option<Teacher>> {
            self.inner.find_teacher(id).await
        }

        async fn teachers_of(&self, school_id: i32) -> StorageResult<Vec<Teacher>> {
            self.inner.teachers_of(school_id).await
        }

        async fn delete_teacher(&self, id: i32) -> StorageResult<Teacher> {
            self.inner.delete_teacher(id).await
        }

        async fn insert_class(&self, class: Class) -> StorageResult<()> {
            self.inner.insert_class(class).await
        }

        async fn find_class(&self, id: i32) -> StorageResult<Option<Class>> {
            match &self.phantom_class {
                Some(class) if class.id == id => Ok(Some(class.clone())),
                _ => self.inner.find_class(id).await,
            }
        }

        async fn classes_of(&self, teacher_id: i32) -> StorageResult<Vec<Class>> {
            self.inner.classes_of(teacher_id).await
        }

        async fn delete_class(&self, id: i32) -> StorageResult<Class> {
            self.inner.delete_class(id).await
        }

        async fn insert_student(&self, student: Student) -> StorageResult<()> {
            self.inner.insert_student(student).await
        }

        async fn find_student(&self, id: i32) -> StorageResult<Option<Student>> {
            if self.hidden_student == Some(id) {
                return Ok(None);
            }
            match &self.phantom_student {
                Some(student) if student.id == id => Ok(Some(student.clone())),
                _ => self.inner.find_student(id).await,
            }
        }

        async fn list_students(&self) -> StorageResult<Vec<Student>> {
            self.inner.list_students().await
        }

        async fn students_of(&self, class_id: i32) -> StorageResult<Vec<Student>> {
            self.inner.students_of(class_id).await
        }

        async fn update_student(&self, student: Student) -> StorageResult<()> {
            self.inner.update_student(student).await
        }

        async fn delete_student(&self, id: i32) -> StorageResult<Student> {
            self.inner.delete_student(id).await
        }

        async fn counts(&self) -> StorageResult<RosterCounts> {
            self.inner.counts().await
        }
    }

    fn vanished_class(id: i32) -> Class {
        Class {
            id,
            name: format!("Class {id}"),
            teacher_id: 1,
        }
    }

    #[tokio::test]
    async fn test_list_returns_all_students() {
        let handler = handler().await;

        let ids: Vec<i32> = handler.list().await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_get_unknown_student() {
        let handler = handler().await;
        assert!(matches!(
            handler.get(999).await,
            Err(RosterError::StudentNotFound(999))
        ));
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let handler = handler().await;

        let created = handler
            .create(StudentPayload::new(3, "John Doe", 1))
            .await
            .unwrap();

        assert_eq!(created.teacher_id, 1);
        assert_eq!(created.school_id, 1);
        assert_eq!(handler.get(3).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_create_checks_name_before_class() {
        let handler = handler().await;
        let payload = StudentPayload {
            id: 3,
            name: None,
            class_id: 999,
        };

        assert!(matches!(
            handler.create(payload).await,
            Err(RosterError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_create_checks_class_before_duplicate() {
        let handler = handler().await;

        assert!(matches!(
            handler.create(StudentPayload::new(1, "Jim Bob", 999)).await,
            Err(RosterError::ClassNotFound(999))
        ));
        assert!(matches!(
            handler.create(StudentPayload::new(1, "Jim Bob", 1)).await,
            Err(RosterError::DuplicateStudent(1))
        ));
    }

    #[tokio::test]
    async fn test_update_moves_student_to_other_school() {
        let handler = handler().await;

        handler
            .update(2, StudentPayload::new(2, "Jaine Dough", 2))
            .await
            .unwrap();

        let record = handler.get(2).await.unwrap();
        assert_eq!(record.name, "Jaine Dough");
        assert_eq!(record.class_id, 2);
        assert_eq!(record.teacher_id, 2);
        assert_eq!(record.school_id, 2);
    }

    #[tokio::test]
    async fn test_update_resolves_class_by_requested_id() {
        let handler = handler().await;

        // Student 2 exists and class 2 exists, but class 3 does not. Looking the
        // class up by the student id would wrongly succeed.
        assert!(matches!(
            handler.update(2, StudentPayload::new(2, "Jane Doe", 3)).await,
            Err(RosterError::ClassNotFound(3))
        ));
    }

    #[tokio::test]
    async fn test_update_validation() {
        let handler = handler().await;

        assert!(matches!(
            handler.update(2, StudentPayload::new(999, "Jaine Dough", 1)).await,
            Err(RosterError::Validation(_))
        ));
        assert!(matches!(
            handler.update(2, StudentPayload::new(2, "", 1)).await,
            Err(RosterError::Validation(_))
        ));
        assert!(matches!(
            handler.update(999, StudentPayload::new(999, "Jaine Dough", 1)).await,
            Err(RosterError::StudentNotFound(999))
        ));
    }

    #[tokio::test]
    async fn test_delete_returns_previous_record() {
        let handler = handler().await;

        let record = handler.delete(1).await.unwrap();

        assert_eq!(record.name, "Jim Bob");
        assert_eq!(record.school_id, 1);
        assert!(matches!(
            handler.get(1).await,
            Err(RosterError::StudentNotFound(1))
        ));
        assert!(matches!(
            handler.delete(1).await,
            Err(RosterError::StudentNotFound(1))
        ));
    }

    #[tokio::test]
    async fn test_create_duplicate_from_store_is_conflict() {
        let mut store = StaleReads::new().await;
        store.hidden_student = Some(1);
        let handler = store.into_handler();

        let result = handler.create(StudentPayload::new(1, "Jim Bob", 1)).await;

        assert!(matches!(result, Err(RosterError::DuplicateStudent(1))), "{result:?}");
    }

    #[tokio::test]
    async fn test_create_into_vanished_class_is_not_found() {
        let mut store = StaleReads::new().await;
        store.phantom_class = Some(vanished_class(9));
        let handler = store.into_handler();

        let result = handler.create(StudentPayload::new(3, "John Doe", 9)).await;

        assert!(matches!(result, Err(RosterError::ClassNotFound(9))), "{result:?}");
    }

    #[tokio::test]
    async fn test_update_into_vanished_class_is_not_found() {
        let mut store = StaleReads::new().await;
        store.phantom_class = Some(vanished_class(9));
        let handler = store.into_handler();

        let result = handler.update(1, StudentPayload::new(1, "Jim Bob", 9)).await;

        assert!(matches!(result, Err(RosterError::ClassNotFound(9))), "{result:?}");
    }

    #[tokio::test]
    async fn test_update_of_vanished_student_is_not_found() {
        let mut store = StaleReads::new().await;
        store.phantom_student = Some(Student {
            id: 42,
            name: "Gone".to_string(),
            class_id: 1,
        });
        let handler = store.into_handler();

        let result = handler.update(42, StudentPayload::new(42, "Gone Again", 1)).await;

        assert!(matches!(result, Err(RosterError::StudentNotFound(42))), "{result:?}");
    }
}
