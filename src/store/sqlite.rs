use chrono::{DateTime, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params_from_iter, Connection, OptionalExtension};

use super::TaskStore;
use crate::calendar::{from_db, to_db};
use crate::error::{Result, ResultExt};
use crate::model::{
    NewTask, Priority, SortField, SortOrder, Status, Task, TaskFilter, TaskSort, TaskUpdate,
};

const TASK_COLUMNS: &str =
    "id, title, description, status, priority, due_date, created_at, updated_at";

const INSERT_TASK: &str = "
INSERT INTO tasks (title, description, status, priority, due_date, created_at, updated_at)
VALUES (?1, ?2, 'pending', ?3, ?4, ?5, ?5)
";

const PRIORITY_RANK: &str = "CASE priority WHEN 'high' THEN 3 WHEN 'medium' THEN 2 WHEN 'low' THEN 1 END";

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn read_timestamp(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    from_db(&raw).map_err(|e| conversion_error(idx, e))
}

fn read_task_row(row: &rusqlite::Row) -> rusqlite::Result<Task> {
    let status: String = row.get(3)?;
    let priority: String = row.get(4)?;
    let due_date = match row.get::<_, Option<String>>(5)? {
        Some(raw) => Some(from_db(&raw).map_err(|e| conversion_error(5, e))?),
        None => None,
    };
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: Status::parse(&status).map_err(|e| conversion_error(3, e))?,
        priority: Priority::parse(&priority).map_err(|e| conversion_error(4, e))?,
        due_date,
        created_at: read_timestamp(row, 6)?,
        updated_at: read_timestamp(row, 7)?,
    })
}

fn order_by(sort: Option<&TaskSort>) -> String {
    let sort = sort.copied().unwrap_or_default();
    let dir = match sort.order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };
    match sort.field {
        SortField::CreatedAt => format!("created_at {dir}, id {dir}"),
        SortField::DueDate => format!("due_date IS NULL, due_date {dir}, id {dir}"),
        SortField::Priority => format!("{PRIORITY_RANK} {dir}, id {dir}"),
    }
}

/// Build the WHERE clause and its positional values for a filter.
fn where_clause(filter: Option<&TaskFilter>) -> (String, Vec<Value>) {
    let mut conditions: Vec<String> = Vec::new();
    let mut values: Vec<Value> = Vec::new();
    if let Some(f) = filter {
        if let Some(status) = f.status {
            values.push(Value::Text(status.as_str().to_string()));
            conditions.push(format!("status = ?{}", values.len()));
        }
        if let Some(priority) = f.priority {
            values.push(Value::Text(priority.as_str().to_string()));
            conditions.push(format!("priority = ?{}", values.len()));
        }
        if let Some(from) = f.due_from {
            values.push(Value::Text(to_db(from)));
            conditions.push(format!("due_date >= ?{}", values.len()));
        }
        if let Some(to) = f.due_to {
            values.push(Value::Text(to_db(to)));
            conditions.push(format!("due_date <= ?{}", values.len()));
        }
    }
    if conditions.is_empty() {
        (String::new(), values)
    } else {
        (format!(" WHERE {}", conditions.join(" AND ")), values)
    }
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    fn query(&self, sql: &str, values: &[Value], context: &str) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(sql).context(context)?;
        let rows = stmt
            .query_map(params_from_iter(values.iter()), read_task_row)
            .context(context)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().context(context)
    }
}

impl TaskStore for SqliteStore {
    fn create(&mut self, task: &NewTask, now: DateTime<Utc>) -> Result<Task> {
        let priority = task.priority.unwrap_or_default();
        self.conn
            .execute(
                INSERT_TASK,
                rusqlite::params![
                    task.title,
                    task.description,
                    priority.as_str(),
                    task.due_date.map(to_db),
                    to_db(now),
                ],
            )
            .context("failed to create task")?;
        let id = self.conn.last_insert_rowid();
        self.conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                [id],
                read_task_row,
            )
            .context("failed to load created task")
    }

    fn get(&self, id: i64) -> Result<Option<Task>> {
        self.conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                [id],
                read_task_row,
            )
            .optional()
            .context("failed to get task")
    }

    fn list(&self, filter: Option<&TaskFilter>, sort: Option<&TaskSort>) -> Result<Vec<Task>> {
        let (where_sql, values) = where_clause(filter);
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks{where_sql} ORDER BY {}",
            order_by(sort)
        );
        self.query(&sql, &values, "failed to list tasks")
    }

    fn update(&mut self, id: i64, update: &TaskUpdate, now: DateTime<Utc>) -> Result<bool> {
        let mut sets: Vec<String> = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        if let Some(title) = &update.title {
            values.push(Value::Text(title.clone()));
            sets.push(format!("title = ?{}", values.len()));
        }
        if let Some(description) = &update.description {
            values.push(Value::Text(description.clone()));
            sets.push(format!("description = ?{}", values.len()));
        }
        if let Some(status) = update.status {
            values.push(Value::Text(status.as_str().to_string()));
            sets.push(format!("status = ?{}", values.len()));
        }
        if let Some(priority) = update.priority {
            values.push(Value::Text(priority.as_str().to_string()));
            sets.push(format!("priority = ?{}", values.len()));
        }
        if let Some(due) = update.due_date {
            values.push(Value::Text(to_db(due)));
            sets.push(format!("due_date = ?{}", values.len()));
        }
        values.push(Value::Text(to_db(now)));
        sets.push(format!("updated_at = MAX(updated_at, ?{})", values.len()));
        values.push(Value::Integer(id));
        let sql = format!(
            "UPDATE tasks SET {} WHERE id = ?{}",
            sets.join(", "),
            values.len()
        );
        let changed = self
            .conn
            .execute(&sql, params_from_iter(values.iter()))
            .context("failed to update task")?;
        Ok(changed > 0)
    }

    fn delete(&mut self, id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1", [id])
            .context("failed to delete task")?;
        Ok(changed > 0)
    }

    fn overdue(&self, now: DateTime<Utc>) -> Result<Vec<Task>> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks \
             WHERE due_date IS NOT NULL AND due_date < ?1 AND status = 'pending' \
             ORDER BY due_date ASC, id ASC"
        );
        self.query(&sql, &[Value::Text(to_db(now))], "failed to get overdue tasks")
    }

    fn due_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<Task>> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks \
             WHERE due_date >= ?1 AND due_date < ?2 \
             ORDER BY due_date ASC, id ASC"
        );
        self.query(
            &sql,
            &[Value::Text(to_db(from)), Value::Text(to_db(to))],
            "failed to get tasks by date range",
        )
    }
}
