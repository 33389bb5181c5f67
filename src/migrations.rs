//! Schema versioning for the task database.
//!
//! The applied version is mirrored to `PRAGMA user_version`. Steps are
//! additive only: columns and tables are added, never dropped or renamed.

use log::{info, warn};
use rusqlite::Connection;

use crate::database::DatabaseError;
use crate::models::DEFAULT_CATEGORIES;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    apply: fn(&Connection) -> Result<(), DatabaseError>,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_tasks",
        apply: create_tasks,
    },
    Migration {
        version: 2,
        name: "add_due_date",
        apply: add_due_date,
    },
    Migration {
        version: 3,
        name: "add_categories",
        apply: add_categories,
    },
];

/// Returns the latest schema version known by this build.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Reads the schema version stored in the database file. A negative value
/// was not written by this application and is refused.
pub fn schema_version(conn: &Connection) -> Result<u32, DatabaseError> {
    let version: i64 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    u32::try_from(version).map_err(|_| {
        warn!(
            "event=db_migrate module=migrations status=refused db_version={}",
            version
        );
        DatabaseError::InvalidSchemaVersion(version)
    })
}

/// Brings the schema up to the latest known version.
pub fn apply_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    migrate_to(conn, latest_version())
}

/// Applies every step above the stored version up to `target`, in ascending order,
/// inside a single transaction. A database newer than this build is refused.
pub fn migrate_to(conn: &Connection, target: u32) -> Result<(), DatabaseError> {
    let current = schema_version(conn)?;
    let latest = latest_version();

    if current > latest {
        warn!(
            "event=db_migrate module=migrations status=refused db_version={} latest_supported={}",
            current, latest
        );
        return Err(DatabaseError::SchemaDowngrade {
            found: current,
            supported: latest,
        });
    }

    let target = target.min(latest);
    if current >= target {
        return Ok(());
    }

    let tx = conn.unchecked_transaction()?;
    for migration in MIGRATIONS {
        if migration.version <= current || migration.version > target {
            continue;
        }

        (migration.apply)(&tx)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
        info!(
            "event=db_migrate module=migrations status=applied version={} name={}",
            migration.version, migration.name
        );
    }
    tx.commit()?;

    Ok(())
}

/// Inserts the default categories when the table holds no rows at all.
/// Returns the number of rows inserted.
pub fn seed_default_categories(conn: &Connection) -> Result<usize, DatabaseError> {
    let existing: i64 = conn.query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
    if existing > 0 {
        return Ok(0);
    }

    let mut stmt = conn.prepare("INSERT INTO categories (id, name, color, icon) VALUES (?1, ?2, ?3, ?4)")?;
    for (id, name, color, icon) in DEFAULT_CATEGORIES {
        stmt.execute(rusqlite::params![id, name, i64::from(color), i64::from(icon)])?;
    }

    info!(
        "event=category_seed module=migrations status=ok inserted={}",
        DEFAULT_CATEGORIES.len()
    );
    Ok(DEFAULT_CATEGORIES.len())
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool, DatabaseError> {
    let mut stmt = conn.prepare("SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2")?;
    let count: i64 = stmt.query_row(rusqlite::params![table, column], |row| row.get(0))?;
    Ok(count > 0)
}

fn create_tasks(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS tasks (
            id              TEXT PRIMARY KEY,
            title           TEXT NOT NULL,
            description     TEXT,
            completed       INTEGER NOT NULL DEFAULT 0,
            priority        TEXT NOT NULL DEFAULT 'medium',
            createdAt       TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks(createdAt);",
    )?;
    Ok(())
}

fn add_due_date(conn: &Connection) -> Result<(), DatabaseError> {
    if !column_exists(conn, "tasks", "dueDate")? {
        conn.execute("ALTER TABLE tasks ADD COLUMN dueDate TEXT", [])?;
    }
    conn.execute("CREATE INDEX IF NOT EXISTS idx_tasks_due_date ON tasks(dueDate)", [])?;
    Ok(())
}

fn add_categories(conn: &Connection) -> Result<(), DatabaseError> {
    if !column_exists(conn, "tasks", "categoryId")? {
        conn.execute("ALTER TABLE tasks ADD COLUMN categoryId TEXT", [])?;
    }
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_tasks_category_id ON tasks(categoryId);
        CREATE TABLE IF NOT EXISTS categories (
            id              TEXT PRIMARY KEY,
            name            TEXT NOT NULL,
            color           INTEGER NOT NULL,
            icon            INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_categories_name ON categories(name);",
    )?;
    seed_default_categories(conn)?;
    Ok(())
}
