//! String-typed facade used by the CLI and the terminal UI.
//!
//! `App` either owns a connected [`TaskUsecase`] or runs offline, when the
//! database could not be opened at startup. Offline, reads come back empty
//! and writes are silently ignored so the interface stays usable.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::calendar::{parse_optional_due_date, Clock, SystemClock};
use crate::config::Config;
use crate::db;
use crate::error::Result;
use crate::model::{Priority, Status, Task, TaskFilter, TaskSort, TaskStats, TaskUpdate};
use crate::service::TaskService;
use crate::store::{SortKey, SqliteStore, TaskStore};
use crate::usecase::{DashboardData, TaskUsecase};

/// A task flattened for display, with the overdue flag resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_overdue: bool,
}

impl TaskView {
    pub fn new(task: Task, now: DateTime<Utc>) -> Self {
        let is_overdue = task.is_overdue(now);
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
            created_at: task.created_at,
            updated_at: task.updated_at,
            is_overdue,
        }
    }
}

impl From<&TaskView> for SortKey {
    fn from(view: &TaskView) -> Self {
        Self {
            id: view.id,
            priority: view.priority,
            due_date: view.due_date,
            created_at: view.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    pub stats: TaskStats,
    pub recent_tasks: Vec<TaskView>,
    pub overdue_tasks: Vec<TaskView>,
    pub today_tasks: Vec<TaskView>,
    pub upcoming_tasks: Vec<TaskView>,
}

fn optional<T>(raw: &str, parse: fn(&str) -> Result<T>) -> Result<Option<T>> {
    if raw.is_empty() {
        Ok(None)
    } else {
        parse(raw).map(Some)
    }
}

fn optional_text(raw: &str) -> Option<String> {
    (!raw.is_empty()).then(|| raw.to_string())
}

/// Build an update from string fields; empty strings leave a field alone.
pub fn parse_update(
    title: &str,
    description: &str,
    status: &str,
    priority: &str,
    due_date: &str,
) -> Result<TaskUpdate> {
    Ok(TaskUpdate {
        title: optional_text(title),
        description: optional_text(description),
        status: optional(status, Status::parse)?,
        priority: optional(priority, Priority::parse)?,
        due_date: parse_optional_due_date(due_date)?,
    })
}

pub struct App<S, C> {
    usecase: Option<TaskUsecase<S, C>>,
}

impl App<SqliteStore, SystemClock> {
    pub fn start(config: &Config) -> Self {
        Self::start_with_clock(config, SystemClock)
    }
}

impl<C: Clock> App<SqliteStore, C> {
    /// Open the configured database and run migrations. A connection failure
    /// leaves the app offline; a migration failure is only logged.
    pub fn start_with_clock(config: &Config, clock: C) -> Self {
        let conn = match db::ensure_parent_dir(&config.db_path)
            .and_then(|()| db::open(&config.db_path, config.busy_timeout))
        {
            Ok(conn) => conn,
            Err(e) => {
                log::error!("database unavailable, running offline: {e}");
                return Self::offline();
            }
        };
        log::info!("opened database {}", config.db_path.display());
        if let Err(e) = db::migrate(&conn) {
            log::warn!("schema migration failed: {e}");
        }
        let service = TaskService::new(SqliteStore::new(conn), clock);
        Self::connected(TaskUsecase::new(service))
    }
}

impl<S: TaskStore, C: Clock> App<S, C> {
    pub fn connected(usecase: TaskUsecase<S, C>) -> Self {
        Self {
            usecase: Some(usecase),
        }
    }

    pub fn offline() -> Self {
        Self { usecase: None }
    }

    pub fn is_offline(&self) -> bool {
        self.usecase.is_none()
    }

    fn view(uc: &TaskUsecase<S, C>, task: Task) -> TaskView {
        TaskView::new(task, uc.service().clock().now_utc())
    }

    fn views(uc: &TaskUsecase<S, C>, tasks: Vec<Task>) -> Vec<TaskView> {
        let now = uc.service().clock().now_utc();
        tasks.into_iter().map(|t| TaskView::new(t, now)).collect()
    }

    pub fn create_task(
        &mut self,
        title: &str,
        description: &str,
        priority: &str,
        due_date: &str,
    ) -> Result<Option<TaskView>> {
        let Some(uc) = self.usecase.as_mut() else {
            return Ok(None);
        };
        let priority = optional(priority, Priority::parse)?;
        let due_date = parse_optional_due_date(due_date)?;
        let task = uc.create_task(title, description, priority, due_date)?;
        Ok(Some(Self::view(uc, task)))
    }

    pub fn get_tasks(
        &self,
        status: &str,
        priority: &str,
        sort_field: &str,
        sort_order: &str,
    ) -> Result<Vec<TaskView>> {
        let Some(uc) = self.usecase.as_ref() else {
            return Ok(Vec::new());
        };
        let tasks = uc.get_tasks(status, priority, sort_field, sort_order)?;
        Ok(Self::views(uc, tasks))
    }

    pub fn list_tasks(&self, filter: &TaskFilter, sort: Option<&TaskSort>) -> Result<Vec<TaskView>> {
        let Some(uc) = self.usecase.as_ref() else {
            return Ok(Vec::new());
        };
        let tasks = uc.list_tasks(filter, sort)?;
        Ok(Self::views(uc, tasks))
    }

    pub fn get_task(&self, id: i64) -> Result<Option<TaskView>> {
        let Some(uc) = self.usecase.as_ref() else {
            return Ok(None);
        };
        let task = uc.get_task(id)?;
        Ok(Some(Self::view(uc, task)))
    }

    pub fn update_task(
        &mut self,
        id: i64,
        title: &str,
        description: &str,
        status: &str,
        priority: &str,
        due_date: &str,
    ) -> Result<Option<TaskView>> {
        let Some(uc) = self.usecase.as_mut() else {
            return Ok(None);
        };
        let update = parse_update(title, description, status, priority, due_date)?;
        let task = uc.update_task(id, update)?;
        Ok(Some(Self::view(uc, task)))
    }

    pub fn delete_task(&mut self, id: i64) -> Result<()> {
        match self.usecase.as_mut() {
            Some(uc) => uc.delete_task(id),
            None => Ok(()),
        }
    }

    pub fn toggle_task_complete(&mut self, id: i64) -> Result<Option<TaskView>> {
        let Some(uc) = self.usecase.as_mut() else {
            return Ok(None);
        };
        let task = uc.toggle_task_complete(id)?;
        Ok(Some(Self::view(uc, task)))
    }

    pub fn get_dashboard_data(&self) -> Result<DashboardView> {
        let Some(uc) = self.usecase.as_ref() else {
            return Ok(DashboardView::default());
        };
        let DashboardData {
            stats,
            recent_tasks,
            overdue_tasks,
            today_tasks,
            upcoming_tasks,
        } = uc.get_dashboard_data()?;
        Ok(DashboardView {
            stats,
            recent_tasks: Self::views(uc, recent_tasks),
            overdue_tasks: Self::views(uc, overdue_tasks),
            today_tasks: Self::views(uc, today_tasks),
            upcoming_tasks: Self::views(uc, upcoming_tasks),
        })
    }

    pub fn search_tasks(&self, query: &str) -> Result<Vec<TaskView>> {
        let Some(uc) = self.usecase.as_ref() else {
            return Ok(Vec::new());
        };
        let tasks = uc.search_tasks(query)?;
        Ok(Self::views(uc, tasks))
    }

    pub fn get_tasks_by_date_filter(&self, filter: &str) -> Result<Vec<TaskView>> {
        let Some(uc) = self.usecase.as_ref() else {
            return Ok(Vec::new());
        };
        let tasks = uc.get_tasks_by_date_filter(filter)?;
        Ok(Self::views(uc, tasks))
    }

    pub fn bulk_update_tasks(
        &mut self,
        ids: &[i64],
        title: &str,
        description: &str,
        status: &str,
        priority: &str,
        due_date: &str,
    ) -> Result<()> {
        let Some(uc) = self.usecase.as_mut() else {
            return Ok(());
        };
        let update = parse_update(title, description, status, priority, due_date)?;
        uc.bulk_update_tasks(ids, update)
    }

    pub fn get_task_stats(&self) -> Result<TaskStats> {
        match self.usecase.as_ref() {
            Some(uc) => uc.get_task_stats(),
            None => Ok(TaskStats::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::FixedClock;
    use crate::store::MemoryStore;
    use chrono::{FixedOffset, TimeZone};

    fn app() -> App<MemoryStore, FixedClock> {
        let now = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 3, 12, 10, 0, 0)
            .unwrap();
        let svc = TaskService::new(MemoryStore::new(), FixedClock::new(now));
        App::connected(TaskUsecase::new(svc))
    }

    #[test]
    fn empty_strings_mean_absent() {
        let update = parse_update("", "", "", "", "").unwrap();
        assert!(update.is_empty());
        let update = parse_update("", "", "completed", "", "2025-04-01T09:00:00Z").unwrap();
        assert_eq!(update.status, Some(Status::Completed));
        assert!(update.due_date.is_some());
        assert!(parse_update("", "", "", "", "next tuesday")
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn create_and_update_through_strings() {
        let mut app = app();
        let view = app
            .create_task("Pay rent", "", "high", "2025-03-31T12:00:00Z")
            .unwrap()
            .unwrap();
        assert_eq!(view.priority, Priority::High);
        assert!(!view.is_overdue);

        let updated = app
            .update_task(view.id, "", "by transfer", "", "", "")
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Pay rent");
        assert_eq!(updated.description, "by transfer");

        // Nothing to change still succeeds; unknown ids are still not found
        let touched = app.update_task(view.id, "", "", "", "", "").unwrap().unwrap();
        assert_eq!(touched.description, "by transfer");
        assert!(touched.updated_at >= updated.updated_at);
        let err = app.update_task(999, "", "", "", "", "").unwrap_err();
        assert!(err.is_not_found());
        assert!(app.create_task("x", "", "urgent", "").unwrap_err().is_validation());
    }

    #[test]
    fn offline_mode_is_inert() {
        let mut app = App::<MemoryStore, FixedClock>::offline();
        assert!(app.is_offline());
        assert_eq!(app.create_task("t", "", "", "").unwrap(), None);
        assert!(app.get_tasks("", "", "", "").unwrap().is_empty());
        assert_eq!(app.get_task(1).unwrap(), None);
        assert_eq!(app.update_task(1, "t", "", "", "", "").unwrap(), None);
        assert_eq!(app.toggle_task_complete(1).unwrap(), None);
        app.delete_task(1).unwrap();
        app.bulk_update_tasks(&[1, 2], "t", "", "", "", "").unwrap();
        assert_eq!(app.get_dashboard_data().unwrap(), DashboardView::default());
        assert!(app.search_tasks("x").unwrap().is_empty());
        assert!(app.get_tasks_by_date_filter("today").unwrap().is_empty());
        assert_eq!(app.get_task_stats().unwrap(), TaskStats::default());
    }

    #[test]
    fn view_serializes_timestamps_as_rfc3339() {
        let mut app = app();
        let view = app.create_task("t", "", "", "").unwrap().unwrap();
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["priority"], "medium");
        assert_eq!(json["due_date"], serde_json::Value::Null);
        assert_eq!(json["created_at"], "2025-03-12T10:00:00Z");
        assert_eq!(json["is_overdue"], false);
    }
}
