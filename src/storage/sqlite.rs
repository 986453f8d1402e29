//! SQLite storage implementation.
//!
//! Foreign keys are enforced by SQLite itself (`PRAGMA foreign_keys = ON`
//! is set on every pooled connection). Constraint failures are translated
//! back into [`StorageError`] variants using the driver's error kind.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, instrument};

use super::entities::{Class, Collection, School, Student, Teacher};
use super::errors::{StorageError, StorageResult};
use super::traits::{RosterCounts, RosterStore};

const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;

const SCHEMA: [&str; 4] = [
    r#"
    CREATE TABLE IF NOT EXISTS schools (
        id    INTEGER PRIMARY KEY NOT NULL,
        name  TEXT NOT NULL CHECK (name <> ''),
        city  TEXT NOT NULL CHECK (city <> ''),
        state TEXT NOT NULL CHECK (state <> '')
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS teachers (
        id        INTEGER PRIMARY KEY NOT NULL,
        name      TEXT NOT NULL CHECK (name <> ''),
        school_id INTEGER NOT NULL REFERENCES schools (id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS classes (
        id         INTEGER PRIMARY KEY NOT NULL,
        name       TEXT NOT NULL CHECK (name <> ''),
        teacher_id INTEGER NOT NULL REFERENCES teachers (id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS students (
        id       INTEGER PRIMARY KEY NOT NULL,
        name     TEXT NOT NULL CHECK (name <> ''),
        class_id INTEGER NOT NULL REFERENCES classes (id)
    )
    "#,
];

/// SQLite connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqliteConfig {
    /// Connection URL, e.g. `sqlite://roster.db` or `sqlite::memory:`
    pub url: String,

    /// Pool size (default: 5). Forced to 1 for in-memory databases.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl SqliteConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: default_max_connections(),
        }
    }

    /// A private in-memory database, alive as long as the store.
    pub fn in_memory() -> Self {
        Self::new("sqlite::memory:")
    }

    fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

/// SQLite implementation of [`RosterStore`].
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens the database and creates the roster tables if they are missing.
    #[instrument(skip(config), fields(url = %config.url))]
    pub async fn connect(config: &SqliteConfig) -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| StorageError::Connection {
                message: format!("invalid sqlite url '{}': {e}", config.url),
            })?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every connection to `:memory:` is its own database, so an
        // in-memory store must keep exactly one connection open forever.
        let pool_options = if config.is_in_memory() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(config.max_connections)
        };

        let pool = pool_options
            .acquire_timeout(Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS))
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection {
                message: e.to_string(),
            })?;

        let store = Self { pool };
        store.create_tables().await?;
        Ok(store)
    }

    /// Opens a fresh in-memory database.
    pub async fn in_memory() -> StorageResult<Self> {
        Self::connect(&SqliteConfig::in_memory()).await
    }

    async fn create_tables(&self) -> StorageResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| query_error("create roster tables", e))?;
        }
        debug!("roster tables ready");
        Ok(())
    }

    async fn count_all(&self, collection: Collection) -> StorageResult<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", collection.table());
        let count: i64 = sqlx::query_scalar(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| query_error("count rows", e))?;
        Ok(count as usize)
    }

    /// Deletes `id` from `collection` unless rows in `dependent` still point at it.
    async fn delete_parent<T>(
        &self,
        collection: Collection,
        id: i32,
        dependent: Collection,
        foreign_key: &str,
    ) -> StorageResult<T>
    where
        T: for<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> + Send + Unpin,
    {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| query_error("begin transaction", e))?;

        let select = format!("SELECT * FROM {} WHERE id = ?", collection.table());
        let row: Option<T> = sqlx::query_as(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| query_error("load row for delete", e))?;
        let row = row.ok_or_else(|| StorageError::not_found(collection, id))?;

        let count_sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {foreign_key} = ?",
            dependent.table()
        );
        let count: i64 = sqlx::query_scalar(&count_sql)
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| query_error("count dependents", e))?;
        if count > 0 {
            return Err(StorageError::HasDependents {
                collection,
                id,
                dependent,
                count: count as usize,
            });
        }

        let delete = format!("DELETE FROM {} WHERE id = ?", collection.table());
        sqlx::query(&delete)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| query_error("delete row", e))?;

        tx.commit()
            .await
            .map_err(|e| query_error("commit delete", e))?;
        Ok(row)
    }
}

fn query_error(action: &str, e: sqlx::Error) -> StorageError {
    StorageError::Query {
        message: format!("failed to {action}: {e}"),
    }
}

/// Translates constraint failures on INSERT/UPDATE.
fn write_error(
    e: sqlx::Error,
    collection: Collection,
    id: i32,
    parent: Option<(Collection, i32)>,
) -> StorageError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            return StorageError::duplicate(collection, id);
        }
        if db_err.is_foreign_key_violation() {
            if let Some((parent, parent_id)) = parent {
                return StorageError::missing_parent(collection, id, parent, parent_id);
            }
        }
        if db_err.is_check_violation() {
            return StorageError::InvalidEntity {
                collection,
                id,
                message: db_err.message().to_string(),
            };
        }
    }
    StorageError::Query {
        message: format!("failed to write {collection} {id}: {e}"),
    }
}

#[async_trait]
impl RosterStore for SqliteStore {
    #[instrument(skip(self, school), fields(id = school.id))]
    async fn insert_school(&self, school: School) -> StorageResult<()> {
        school.validate()?;
        sqlx::query("INSERT INTO schools (id, name, city, state) VALUES (?, ?, ?, ?)")
            .bind(school.id)
            .bind(&school.name)
            .bind(&school.city)
            .bind(&school.state)
            .execute(&self.pool)
            .await
            .map_err(|e| write_error(e, Collection::School, school.id, None))?;
        Ok(())
    }

    async fn find_school(&self, id: i32) -> StorageResult<Option<School>> {
        sqlx::query_as::<_, School>("SELECT id, name, city, state FROM schools WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("find school", e))
    }

    #[instrument(skip(self))]
    async fn delete_school(&self, id: i32) -> StorageResult<School> {
        self.delete_parent(Collection::School, id, Collection::Teacher, "school_id")
            .await
    }

    #[instrument(skip(self, teacher), fields(id = teacher.id))]
    async fn insert_teacher(&self, teacher: Teacher) -> StorageResult<()> {
        teacher.validate()?;
        sqlx::query("INSERT INTO teachers (id, name, school_id) VALUES (?, ?, ?)")
            .bind(teacher.id)
            .bind(&teacher.name)
            .bind(teacher.school_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                write_error(
                    e,
                    Collection::Teacher,
                    teacher.id,
                    Some((Collection::School, teacher.school_id)),
                )
            })?;
        Ok(())
    }

    async fn find_teacher(&self, id: i32) -> StorageResult<Option<Teacher>> {
        sqlx::query_as::<_, Teacher>("SELECT id, name, school_id FROM teachers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("find teacher", e))
    }

    async fn teachers_of(&self, school_id: i32) -> StorageResult<Vec<Teacher>> {
        sqlx::query_as::<_, Teacher>(
            "SELECT id, name, school_id FROM teachers WHERE school_id = ? ORDER BY id",
        )
        .bind(school_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_error("list teachers", e))
    }

    #[instrument(skip(self))]
    async fn delete_teacher(&self, id: i32) -> StorageResult<Teacher> {
        self.delete_parent(Collection::Teacher, id, Collection::Class, "teacher_id")
            .await
    }

    #[instrument(skip(self, class), fields(id = class.id))]
    async fn insert_class(&self, class: Class) -> StorageResult<()> {
        class.validate()?;
        sqlx::query("INSERT INTO classes (id, name, teacher_id) VALUES (?, ?, ?)")
            .bind(class.id)
            .bind(&class.name)
            .bind(class.teacher_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                write_error(
                    e,
                    Collection::Class,
                    class.id,
                    Some((Collection::Teacher, class.teacher_id)),
                )
            })?;
        Ok(())
    }

    async fn find_class(&self, id: i32) -> StorageResult<Option<Class>> {
        sqlx::query_as::<_, Class>("SELECT id, name, teacher_id FROM classes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("find class", e))
    }

    async fn classes_of(&self, teacher_id: i32) -> StorageResult<Vec<Class>> {
        sqlx::query_as::<_, Class>(
            "SELECT id, name, teacher_id FROM classes WHERE teacher_id = ? ORDER BY id",
        )
        .bind(teacher_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_error("list classes", e))
    }

    #[instrument(skip(self))]
    async fn delete_class(&self, id: i32) -> StorageResult<Class> {
        self.delete_parent(Collection::Class, id, Collection::Student, "class_id")
            .await
    }

    #[instrument(skip(self, student), fields(id = student.id))]
    async fn insert_student(&self, student: Student) -> StorageResult<()> {
        student.validate()?;
        sqlx::query("INSERT INTO students (id, name, class_id) VALUES (?, ?, ?)")
            .bind(student.id)
            .bind(&student.name)
            .bind(student.class_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                write_error(
                    e,
                    Collection::Student,
                    student.id,
                    Some((Collection::Class, student.class_id)),
                )
            })?;
        Ok(())
    }

    async fn find_student(&self, id: i32) -> StorageResult<Option<Student>> {
        sqlx::query_as::<_, Student>("SELECT id, name, class_id FROM students WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("find student", e))
    }

    async fn list_students(&self) -> StorageResult<Vec<Student>> {
        sqlx::query_as::<_, Student>("SELECT id, name, class_id FROM students ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_error("list students", e))
    }

    async fn students_of(&self, class_id: i32) -> StorageResult<Vec<Student>> {
        sqlx::query_as::<_, Student>(
            "SELECT id, name, class_id FROM students WHERE class_id = ? ORDER BY id",
        )
        .bind(class_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_error("list students of class", e))
    }

    #[instrument(skip(self, student), fields(id = student.id))]
    async fn update_student(&self, student: Student) -> StorageResult<()> {
        student.validate()?;
        let result = sqlx::query("UPDATE students SET name = ?, class_id = ? WHERE id = ?")
            .bind(&student.name)
            .bind(student.class_id)
            .bind(student.id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                write_error(
                    e,
                    Collection::Student,
                    student.id,
                    Some((Collection::Class, student.class_id)),
                )
            })?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found(Collection::Student, student.id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_student(&self, id: i32) -> StorageResult<Student> {
        sqlx::query_as::<_, Student>(
            "DELETE FROM students WHERE id = ? RETURNING id, name, class_id",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_error("delete student", e))?
        .ok_or_else(|| StorageError::not_found(Collection::Student, id))
    }

    async fn counts(&self) -> StorageResult<RosterCounts> {
        Ok(RosterCounts {
            schools: self.count_all(Collection::School).await?,
            teachers: self.count_all(Collection::Teacher).await?,
            classes: self.count_all(Collection::Class).await?,
            students: self.count_all(Collection::Student).await?,
        })
    }
}
