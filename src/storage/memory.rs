//! In-memory storage implementation.
//!
//! Each collection is a `BTreeMap` keyed by id, so listing is in ascending
//! key order for free. All four tables sit behind one `RwLock`; every trait
//! call takes the lock once, which makes each call atomic with respect to
//! the referential checks it performs.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::instrument;

use super::entities::{Class, Collection, School, Student, Teacher};
use super::errors::{StorageError, StorageResult};
use super::traits::{RosterCounts, RosterStore};

#[derive(Debug, Default)]
struct Tables {
    schools: BTreeMap<i32, School>,
    teachers: BTreeMap<i32, Teacher>,
    classes: BTreeMap<i32, Class>,
    students: BTreeMap<i32, Student>,
}

impl Tables {
    fn ensure_school(&self, collection: Collection, id: i32, school_id: i32) -> StorageResult<()> {
        if self.schools.contains_key(&school_id) {
            Ok(())
        } else {
            Err(StorageError::missing_parent(collection, id, Collection::School, school_id))
        }
    }

    fn ensure_teacher(&self, collection: Collection, id: i32, teacher_id: i32) -> StorageResult<()> {
        if self.teachers.contains_key(&teacher_id) {
            Ok(())
        } else {
            Err(StorageError::missing_parent(collection, id, Collection::Teacher, teacher_id))
        }
    }

    fn ensure_class(&self, collection: Collection, id: i32, class_id: i32) -> StorageResult<()> {
        if self.classes.contains_key(&class_id) {
            Ok(())
        } else {
            Err(StorageError::missing_parent(collection, id, Collection::Class, class_id))
        }
    }
}

/// In-memory implementation of [`RosterStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store wrapped in Arc.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

fn refuse_if_children(
    collection: Collection,
    id: i32,
    dependent: Collection,
    count: usize,
) -> StorageResult<()> {
    if count > 0 {
        return Err(StorageError::HasDependents {
            collection,
            id,
            dependent,
            count,
        });
    }
    Ok(())
}

#[async_trait]
impl RosterStore for MemoryStore {
    #[instrument(skip(self, school), fields(id = school.id))]
    async fn insert_school(&self, school: School) -> StorageResult<()> {
        school.validate()?;
        let mut tables = self.tables.write().await;
        if tables.schools.contains_key(&school.id) {
            return Err(StorageError::duplicate(Collection::School, school.id));
        }
        tables.schools.insert(school.id, school);
        Ok(())
    }

    async fn find_school(&self, id: i32) -> StorageResult<Option<School>> {
        Ok(self.tables.read().await.schools.get(&id).cloned())
    }

    #[instrument(skip(self))]
    async fn delete_school(&self, id: i32) -> StorageResult<School> {
        let mut tables = self.tables.write().await;
        if !tables.schools.contains_key(&id) {
            return Err(StorageError::not_found(Collection::School, id));
        }
        let count = tables.teachers.values().filter(|t| t.school_id == id).count();
        refuse_if_children(Collection::School, id, Collection::Teacher, count)?;
        tables
            .schools
            .remove(&id)
            .ok_or_else(|| StorageError::not_found(Collection::School, id))
    }

    #[instrument(skip(self, teacher), fields(id = teacher.id))]
    async fn insert_teacher(&self, teacher: Teacher) -> StorageResult<()> {
        teacher.validate()?;
        let mut tables = self.tables.write().await;
        if tables.teachers.contains_key(&teacher.id) {
            return Err(StorageError::duplicate(Collection::Teacher, teacher.id));
        }
        tables.ensure_school(Collection::Teacher, teacher.id, teacher.school_id)?;
        tables.teachers.insert(teacher.id, teacher);
        Ok(())
    }

    async fn find_teacher(&self, id: i32) -> StorageResult<Option<Teacher>> {
        Ok(self.tables.read().await.teachers.get(&id).cloned())
    }

    async fn teachers_of(&self, school_id: i32) -> StorageResult<Vec<Teacher>> {
        let tables = self.tables.read().await;
        Ok(tables
            .teachers
            .values()
            .filter(|t| t.school_id == school_id)
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    async fn delete_teacher(&self, id: i32) -> StorageResult<Teacher> {
        let mut tables = self.tables.write().await;
        if !tables.teachers.contains_key(&id) {
            return Err(StorageError::not_found(Collection::Teacher, id));
        }
        let count = tables.classes.values().filter(|c| c.teacher_id == id).count();
        refuse_if_children(Collection::Teacher, id, Collection::Class, count)?;
        tables
            .teachers
            .remove(&id)
            .ok_or_else(|| StorageError::not_found(Collection::Teacher, id))
    }

    #[instrument(skip(self, class), fields(id = class.id))]
    async fn insert_class(&self, class: Class) -> StorageResult<()> {
        class.validate()?;
        let mut tables = self.tables.write().await;
        if tables.classes.contains_key(&class.id) {
            return Err(StorageError::duplicate(Collection::Class, class.id));
        }
        tables.ensure_teacher(Collection::Class, class.id, class.teacher_id)?;
        tables.classes.insert(class.id, class);
        Ok(())
    }

    async fn find_class(&self, id: i32) -> StorageResult<Option<Class>> {
        Ok(self.tables.read().await.classes.get(&id).cloned())
    }

    async fn classes_of(&self, teacher_id: i32) -> StorageResult<Vec<Class>> {
        let tables = self.tables.read().await;
        Ok(tables
            .classes
            .values()
            .filter(|c| c.teacher_id == teacher_id)
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    async fn delete_class(&self, id: i32) -> StorageResult<Class> {
        let mut tables = self.tables.write().await;
        if !tables.classes.contains_key(&id) {
            return Err(StorageError::not_found(Collection::Class, id));
        }
        let count = tables.students.values().filter(|s| s.class_id == id).count();
        refuse_if_children(Collection::Class, id, Collection::Student, count)?;
        tables
            .classes
            .remove(&id)
            .ok_or_else(|| StorageError::not_found(Collection::Class, id))
    }

    #[instrument(skip(self, student), fields(id = student.id))]
    async fn insert_student(&self, student: Student) -> StorageResult<()> {
        student.validate()?;
        let mut tables = self.tables.write().await;
        if tables.students.contains_key(&student.id) {
            return Err(StorageError::duplicate(Collection::Student, student.id));
        }
        tables.ensure_class(Collection::Student, student.id, student.class_id)?;
        tables.students.insert(student.id, student);
        Ok(())
    }

    async fn find_student(&self, id: i32) -> StorageResult<Option<Student>> {
        Ok(self.tables.read().await.students.get(&id).cloned())
    }

    async fn list_students(&self) -> StorageResult<Vec<Student>> {
        Ok(self.tables.read().await.students.values().cloned().collect())
    }

    async fn students_of(&self, class_id: i32) -> StorageResult<Vec<Student>> {
        let tables = self.tables.read().await;
        Ok(tables
            .students
            .values()
            .filter(|s| s.class_id == class_id)
            .cloned()
            .collect())
    }

    #[instrument(skip(self, student), fields(id = student.id))]
    async fn update_student(&self, student: Student) -> StorageResult<()> {
        student.validate()?;
        let mut tables = self.tables.write().await;
        if !tables.students.contains_key(&student.id) {
            return Err(StorageError::not_found(Collection::Student, student.id));
        }
        tables.ensure_class(Collection::Student, student.id, student.class_id)?;
        tables.students.insert(student.id, student);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_student(&self, id: i32) -> StorageResult<Student> {
        self.tables
            .write()
            .await
            .students
            .remove(&id)
            .ok_or_else(|| StorageError::not_found(Collection::Student, id))
    }

    async fn counts(&self) -> StorageResult<RosterCounts> {
        let tables = self.tables.read().await;
        Ok(RosterCounts {
            schools: tables.schools.len(),
            teachers: tables.teachers.len(),
            classes: tables.classes.len(),
            students: tables.students.len(),
        })
    }
}
