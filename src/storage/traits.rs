//! RosterStore trait definition.

use async_trait::async_trait;
use serde::Serialize;

use super::entities::{Class, School, Student, Teacher};
use super::errors::StorageResult;

/// Row counts per collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RosterCounts {
    pub schools: usize,
    pub teachers: usize,
    pub classes: usize,
    pub students: usize,
}

/// Durable storage for the school → teacher → class → student hierarchy.
///
/// Implementations must be thread-safe and enforce:
///
/// - unique keys per collection (`DuplicateKey`)
/// - existing parents on insert and update (`MissingParent`)
/// - non-empty required fields (`InvalidEntity`)
/// - reject-if-children on delete (`HasDependents`)
///
/// Each call is atomic for the entity it touches. Listing methods return
/// rows in ascending key order.
#[async_trait]
pub trait RosterStore: Send + Sync + 'static {
    // Schools

    async fn insert_school(&self, school: School) -> StorageResult<()>;

    async fn find_school(&self, id: i32) -> StorageResult<Option<School>>;

    /// Removes a school with no teachers and returns it.
    async fn delete_school(&self, id: i32) -> StorageResult<School>;

    // Teachers

    async fn insert_teacher(&self, teacher: Teacher) -> StorageResult<()>;

    async fn find_teacher(&self, id: i32) -> StorageResult<Option<Teacher>>;

    async fn teachers_of(&self, school_id: i32) -> StorageResult<Vec<Teacher>>;

    /// Removes a teacher with no classes and returns it.
    async fn delete_teacher(&self, id: i32) -> StorageResult<Teacher>;

    // Classes

    async fn insert_class(&self, class: Class) -> StorageResult<()>;

    async fn find_class(&self, id: i32) -> StorageResult<Option<Class>>;

    async fn classes_of(&self, teacher_id: i32) -> StorageResult<Vec<Class>>;

    /// Removes a class with no students and returns it.
    async fn delete_class(&self, id: i32) -> StorageResult<Class>;

    // Students

    async fn insert_student(&self, student: Student) -> StorageResult<()>;

    async fn find_student(&self, id: i32) -> StorageResult<Option<Student>>;

    async fn list_students(&self) -> StorageResult<Vec<Student>>;

    async fn students_of(&self, class_id: i32) -> StorageResult<Vec<Student>>;

    /// Replaces the stored student with the same key.
    async fn update_student(&self, student: Student) -> StorageResult<()>;

    async fn delete_student(&self, id: i32) -> StorageResult<Student>;

    async fn counts(&self) -> StorageResult<RosterCounts>;
}
