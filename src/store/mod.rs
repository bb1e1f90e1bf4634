//! Persistence gateway.
//!
//! `TaskStore` is the seam between the service and storage. `SqliteStore`
//! is the real implementation; `MemoryStore` stands in for it in tests.
//! Both must agree on filtering and ordering, which is pinned down here.

mod memory;
mod sqlite;

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::model::{
    NewTask, Priority, SortField, SortOrder, Task, TaskFilter, TaskSort, TaskUpdate,
};

pub trait TaskStore {
    /// Insert a pending task stamped with `now` and return it as stored.
    fn create(&mut self, task: &NewTask, now: DateTime<Utc>) -> Result<Task>;

    fn get(&self, id: i64) -> Result<Option<Task>>;

    /// All tasks matching `filter`, ordered by `sort` (newest first when absent).
    fn list(&self, filter: Option<&TaskFilter>, sort: Option<&TaskSort>) -> Result<Vec<Task>>;

    /// Apply the present fields of `update` and bump `updated_at`.
    /// Returns false when no task has this id.
    fn update(&mut self, id: i64, update: &TaskUpdate, now: DateTime<Utc>) -> Result<bool>;

    /// Returns false when no task has this id.
    fn delete(&mut self, id: i64) -> Result<bool>;

    /// Pending tasks due strictly before `now`, earliest first.
    fn overdue(&self, now: DateTime<Utc>) -> Result<Vec<Task>>;

    /// Tasks due in `[from, to)`, earliest first.
    fn due_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<Task>>;
}

/// The fields a [`TaskSort`] looks at.
#[derive(Debug, Clone, Copy)]
pub struct SortKey {
    pub id: i64,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&Task> for SortKey {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            priority: task.priority,
            due_date: task.due_date,
            created_at: task.created_at,
        }
    }
}

/// Total order used by `list`.
pub fn compare(a: &Task, b: &Task, sort: &TaskSort) -> Ordering {
    compare_keys(a.into(), b.into(), sort)
}

/// Undated tasks sort last for due-date sorts in either direction; ties fall
/// back to id in the sort direction.
pub fn compare_keys(a: SortKey, b: SortKey, sort: &TaskSort) -> Ordering {
    let directed = |ord: Ordering| match sort.order {
        SortOrder::Asc => ord,
        SortOrder::Desc => ord.reverse(),
    };
    let primary = match sort.field {
        SortField::CreatedAt => directed(a.created_at.cmp(&b.created_at)),
        SortField::Priority => directed(a.priority.rank().cmp(&b.priority.rank())),
        SortField::DueDate => match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => directed(x.cmp(&y)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    };
    primary.then_with(|| directed(a.id.cmp(&b.id)))
}
