use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;

use crate::error::{Result, ResultExt};

/// Ordered schema migrations. Entry `i` upgrades the schema to version `i + 1`,
/// tracked in `PRAGMA user_version`.
const MIGRATIONS: &[&str] = &[
    "
CREATE TABLE IF NOT EXISTS tasks (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT NOT NULL CHECK(length(title) BETWEEN 1 AND 255),
    description TEXT NOT NULL DEFAULT '' CHECK(length(description) <= 1000),
    status      TEXT NOT NULL DEFAULT 'pending' CHECK(status IN ('pending', 'completed')),
    priority    TEXT NOT NULL DEFAULT 'medium' CHECK(priority IN ('low', 'medium', 'high')),
    due_date    TEXT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);
",
    "
CREATE INDEX IF NOT EXISTS idx_tasks_due_date ON tasks(due_date);
CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);
",
];

pub fn latest_version() -> u32 {
    MIGRATIONS.len() as u32
}

fn set_pragmas(conn: &Connection, busy_timeout: Duration) -> Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA foreign_keys = ON;",
    )
    .context("failed to set pragmas")?;
    conn.busy_timeout(busy_timeout)
        .context("failed to set busy timeout")?;
    Ok(())
}

pub fn ensure_parent_dir(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .context(&format!("failed to create directory {}", parent.display()))?;
        }
    }
    Ok(())
}

pub fn open(db_path: &Path, busy_timeout: Duration) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .context(&format!("failed to open database {}", db_path.display()))?;
    set_pragmas(&conn, busy_timeout)?;
    Ok(conn)
}

pub fn schema_version(conn: &Connection) -> Result<u32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read schema version")
}

/// Apply pending migrations, each in its own transaction.
/// Returns the number of migrations applied.
pub fn migrate(conn: &Connection) -> Result<usize> {
    let current = schema_version(conn)? as usize;
    let mut applied = 0;
    for (i, sql) in MIGRATIONS.iter().enumerate().skip(current) {
        let version = i + 1;
        let tx = conn
            .unchecked_transaction()
            .context("failed to begin migration")?;
        tx.execute_batch(sql)
            .context(&format!("migration {version} failed"))?;
        tx.pragma_update(None, "user_version", version as u32)
            .context("failed to record schema version")?;
        tx.commit().context("failed to commit migration")?;
        log::info!("applied schema migration {version}");
        applied += 1;
    }
    Ok(applied)
}

/// Cheap round trip to confirm the connection is usable.
pub fn health(conn: &Connection) -> Result<()> {
    conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
        .context("database health check failed")?;
    Ok(())
}

#[cfg(test)]
pub fn open_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    set_pragmas(&conn, Duration::from_millis(5000))?;
    migrate(&conn)?;
    Ok(conn)
}
