use log::{debug, error, info};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::time::Instant;
use thiserror::Error;

use crate::migrations;
use crate::models::{self, Category, Priority, Task};

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Duplicate id: {0}")]
    DuplicateId(String),
    #[error("Database schema version {found} is newer than supported {supported}")]
    SchemaDowngrade { found: u32, supported: u32 },
    #[error("Database schema version {0} is not a valid version")]
    InvalidSchemaVersion(i64),
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] rusqlite::Error),
    #[error("Failed to create database directory: {0}")]
    DirectoryError(String),
}

const TASK_COLUMNS: &str = "id, title, description, completed, priority, createdAt, dueDate, categoryId";
const CATEGORY_COLUMNS: &str = "id, name, color, icon";

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database file, apply pending migrations and seed
    /// default categories into an empty categories table.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let db_path = path.as_ref();
        let started_at = Instant::now();
        info!("event=db_open module=db status=start mode=file");

        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DatabaseError::DirectoryError(e.to_string()))?;
            }
        }

        let result = Connection::open(db_path)
            .map_err(DatabaseError::from)
            .and_then(Self::bootstrap);
        Self::log_open("file", started_at, &result);
        result
    }

    /// Open a private in-memory database with the full schema applied.
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let started_at = Instant::now();
        info!("event=db_open module=db status=start mode=memory");

        let result = Connection::open_in_memory()
            .map_err(DatabaseError::from)
            .and_then(Self::bootstrap);
        Self::log_open("memory", started_at, &result);
        result
    }

    fn bootstrap(conn: Connection) -> Result<Self, DatabaseError> {
        migrations::apply_migrations(&conn)?;
        migrations::seed_default_categories(&conn)?;
        Ok(Database { conn })
    }

    fn log_open(mode: &str, started_at: Instant, result: &Result<Self, DatabaseError>) {
        match result {
            Ok(_) => info!(
                "event=db_open module=db status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=db_open module=db status=error mode={} duration_ms={} error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            ),
        }
    }

    /// Get a reference to the underlying connection
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Current on-disk schema version
    pub fn schema_version(&self) -> Result<u32, DatabaseError> {
        migrations::schema_version(&self.conn)
    }

    /// Insert a new task. Fails with `DuplicateId` if the id is already stored.
    pub fn create_task(&self, task: &Task) -> Result<Task, DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO tasks (id, title, description, completed, priority, createdAt, dueDate, categoryId)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                task.id,
                task.title,
                task.description,
                if task.completed { 1 } else { 0 },
                task.priority.as_str(),
                models::format_timestamp(&task.created_at),
                task.due_date.as_ref().map(models::format_date),
                task.category_id,
            ],
        )
        .map_err(|e| map_insert_error(e, &task.id))?;
        tx.commit()?;

        debug!("event=task_create module=db status=ok id={}", task.id);
        Ok(task.clone())
    }

    /// Helper function to map a row to a Task
    fn row_to_task(row: &rusqlite::Row) -> Result<Task, rusqlite::Error> {
        let priority: String = row.get(4)?;
        let created_at: String = row.get(5)?;
        let due_date: Option<String> = row.get(6)?;

        Ok(Task {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            completed: row.get::<_, i64>(3)? != 0,
            priority: Priority::from_token(&priority),
            created_at: models::parse_timestamp(&created_at)
                .ok_or_else(|| rusqlite::Error::InvalidColumnType(5, "createdAt".to_string(), Type::Text))?,
            due_date: due_date.as_deref().and_then(models::parse_due_date),
            category_id: row.get(7)?,
        })
    }

    /// Get a single task by ID
    pub fn get_task(&self, id: &str) -> Result<Task, DatabaseError> {
        self.find_task(id)?
            .ok_or_else(|| DatabaseError::NotFound(id.to_string()))
    }

    /// Get a single task by ID, `None` when absent
    pub fn find_task(&self, id: &str) -> Result<Option<Task>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"))?;
        let task = stmt
            .query_row(rusqlite::params![id], Self::row_to_task)
            .optional()?;
        Ok(task)
    }

    /// Get all tasks, most recently created first
    pub fn get_all_tasks(&self) -> Result<Vec<Task>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks ORDER BY createdAt DESC"
        ))?;
        let mut tasks = stmt.query_map([], Self::row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;
        // Legacy rows store naive or space-separated timestamps, so text order is not time order
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(tasks)
    }

    /// Replace the stored task with the same id. `createdAt` is never rewritten.
    /// Returns the number of rows changed; 0 means no such task.
    pub fn update_task(&self, task: &Task) -> Result<usize, DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE tasks SET title = ?1, description = ?2, completed = ?3, priority = ?4,
             dueDate = ?5, categoryId = ?6 WHERE id = ?7",
            rusqlite::params![
                task.title,
                task.description,
                if task.completed { 1 } else { 0 },
                task.priority.as_str(),
                task.due_date.as_ref().map(models::format_date),
                task.category_id,
                task.id,
            ],
        )?;
        tx.commit()?;

        debug!("event=task_update module=db status=ok id={} changed={}", task.id, changed);
        Ok(changed)
    }

    /// Delete a task by ID, returning the number of rows removed
    pub fn delete_task(&self, id: &str) -> Result<usize, DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        let removed = tx.execute("DELETE FROM tasks WHERE id = ?1", rusqlite::params![id])?;
        tx.commit()?;

        debug!("event=task_delete module=db status=ok id={} removed={}", id, removed);
        Ok(removed)
    }

    /// Insert a new category. Fails with `DuplicateId` if the id is already stored.
    pub fn create_category(&self, category: &Category) -> Result<Category, DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO categories (id, name, color, icon) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                category.id,
                category.name,
                i64::from(category.color),
                i64::from(category.icon),
            ],
        )
        .map_err(|e| map_insert_error(e, &category.id))?;
        tx.commit()?;

        debug!("event=category_create module=db status=ok id={}", category.id);
        Ok(category.clone())
    }

    fn row_to_category(row: &rusqlite::Row) -> Result<Category, rusqlite::Error> {
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
            color: get_u32(row, 2)?,
            icon: get_u32(row, 3)?,
        })
    }

    /// Get a single category by ID
    pub fn get_category(&self, id: &str) -> Result<Category, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1"
        ))?;
        stmt.query_row(rusqlite::params![id], Self::row_to_category)
            .optional()?
            .ok_or_else(|| DatabaseError::NotFound(id.to_string()))
    }

    /// Get all categories ordered by name ASC
    pub fn get_all_categories(&self) -> Result<Vec<Category>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name ASC"
        ))?;
        let categories = stmt.query_map([], Self::row_to_category)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    /// Update an existing category, returning the number of rows changed
    pub fn update_category(&self, category: &Category) -> Result<usize, DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE categories SET name = ?1, color = ?2, icon = ?3 WHERE id = ?4",
            rusqlite::params![
                category.name,
                i64::from(category.color),
                i64::from(category.icon),
                category.id,
            ],
        )?;
        tx.commit()?;
        Ok(changed)
    }

    /// Delete a category by ID. Tasks keep their (now dangling) category id.
    pub fn delete_category(&self, id: &str) -> Result<usize, DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        let removed = tx.execute("DELETE FROM categories WHERE id = ?1", rusqlite::params![id])?;
        tx.commit()?;

        debug!("event=category_delete module=db status=ok id={} removed={}", id, removed);
        Ok(removed)
    }
}

fn get_u32(row: &rusqlite::Row, idx: usize) -> Result<u32, rusqlite::Error> {
    let value: i64 = row.get(idx)?;
    u32::try_from(value)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(e)))
}

fn map_insert_error(err: rusqlite::Error, id: &str) -> DatabaseError {
    match err {
        rusqlite::Error::SqliteFailure(ref e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
        {
            DatabaseError::DuplicateId(id.to_string())
        }
        other => DatabaseError::StorageUnavailable(other),
    }
}
