//! Input shaping over [`TaskService`]: trimming, string-typed filters, past
//! due date checks, search, dashboard aggregation and bulk edits.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::calendar::{is_same_day, Clock};
use crate::error::{BulkFailure, BulkUpdateError, Error, Result};
use crate::model::{
    DateFilter, NewTask, Priority, SortField, SortOrder, Status, Task, TaskFilter, TaskSort,
    TaskStats, TaskUpdate,
};
use crate::service::{compute_stats, TaskService};
use crate::store::TaskStore;

/// How many tasks the dashboard shows as "recent".
pub const RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardData {
    pub stats: TaskStats,
    pub recent_tasks: Vec<Task>,
    pub overdue_tasks: Vec<Task>,
    pub today_tasks: Vec<Task>,
    pub upcoming_tasks: Vec<Task>,
}

pub struct TaskUsecase<S, C> {
    service: TaskService<S, C>,
}

/// "all" and "" mean no constraint on that dimension.
fn parse_dimension<T>(raw: &str, parse: fn(&str) -> Result<T>) -> Result<Option<T>> {
    match raw {
        "" | "all" => Ok(None),
        other => parse(other).map(Some),
    }
}

impl<S: TaskStore, C: Clock> TaskUsecase<S, C> {
    pub fn new(service: TaskService<S, C>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &TaskService<S, C> {
        &self.service
    }

    fn now(&self) -> DateTime<Utc> {
        self.service.clock().now_utc()
    }

    fn reject_past(&self, due: Option<DateTime<Utc>>) -> Result<()> {
        match due {
            Some(due) if due < self.now() => Err(Error::validation("due date cannot be in the past")),
            _ => Ok(()),
        }
    }

    /// Trim text fields and apply the past due date rule to an update.
    fn shape_update(&self, mut update: TaskUpdate) -> Result<TaskUpdate> {
        if let Some(title) = update.title.as_mut() {
            *title = title.trim().to_string();
            if title.is_empty() {
                return Err(Error::validation("task title cannot be empty"));
            }
        }
        if let Some(description) = update.description.as_mut() {
            *description = description.trim().to_string();
        }
        self.reject_past(update.due_date)?;
        Ok(update)
    }

    pub fn create_task(
        &mut self,
        title: &str,
        description: &str,
        priority: Option<Priority>,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<Task> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::validation("task title cannot be empty"));
        }
        self.reject_past(due_date)?;
        self.service.create_task(NewTask {
            title: title.to_string(),
            description: description.trim().to_string(),
            priority,
            due_date,
        })
    }

    pub fn get_task(&self, id: i64) -> Result<Task> {
        self.service.get_task(id)
    }

    pub fn update_task(&mut self, id: i64, update: TaskUpdate) -> Result<Task> {
        let update = self.shape_update(update)?;
        self.service.update_task(id, &update)
    }

    pub fn delete_task(&mut self, id: i64) -> Result<()> {
        self.service.delete_task(id)
    }

    pub fn toggle_task_complete(&mut self, id: i64) -> Result<Task> {
        self.service.toggle_task_status(id)
    }

    /// String-typed listing. An empty sort field keeps the default order.
    pub fn get_tasks(
        &self,
        status: &str,
        priority: &str,
        sort_field: &str,
        sort_order: &str,
    ) -> Result<Vec<Task>> {
        let filter = TaskFilter {
            status: parse_dimension(status, Status::parse)?,
            priority: parse_dimension(priority, Priority::parse)?,
            ..Default::default()
        };
        let sort = match sort_field {
            "" => None,
            field => Some(TaskSort {
                field: SortField::parse(field)?,
                order: SortOrder::parse_lenient(sort_order),
            }),
        };
        self.service.get_all_tasks(Some(&filter), sort.as_ref())
    }

    pub fn list_tasks(&self, filter: &TaskFilter, sort: Option<&TaskSort>) -> Result<Vec<Task>> {
        self.service.get_all_tasks(Some(filter), sort)
    }

    /// Case-insensitive substring match on title or description.
    pub fn search_tasks(&self, query: &str) -> Result<Vec<Task>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Err(Error::validation("search query cannot be empty"));
        }
        let tasks = self.service.get_all_tasks(None, None)?;
        Ok(tasks
            .into_iter()
            .filter(|t| {
                t.title.to_lowercase().contains(&needle)
                    || t.description.to_lowercase().contains(&needle)
            })
            .collect())
    }

    pub fn get_tasks_by_date_filter(&self, filter: &str) -> Result<Vec<Task>> {
        self.service.get_tasks_by_date_filter(filter)
    }

    pub fn get_task_stats(&self) -> Result<TaskStats> {
        self.service.get_task_stats()
    }

    /// Upcoming excludes anything due on today's date so it never overlaps
    /// `today_tasks`.
    pub fn get_dashboard_data(&self) -> Result<DashboardData> {
        let all = self.service.get_all_tasks(None, None)?;
        let stats = compute_stats(&all, self.now());
        let recent_tasks = all.into_iter().take(RECENT_LIMIT).collect();
        let overdue_tasks = self.service.get_overdue_tasks()?;
        let today_tasks = self.service.get_tasks_in_bucket(DateFilter::Today)?;
        let now = self.service.clock().now();
        let upcoming_tasks = self
            .service
            .get_tasks_in_bucket(DateFilter::Week)?
            .into_iter()
            .filter(|t| t.due_date.is_some_and(|due| !is_same_day(due, now)))
            .collect();
        Ok(DashboardData {
            stats,
            recent_tasks,
            overdue_tasks,
            today_tasks,
            upcoming_tasks,
        })
    }

    /// Apply one update to every id in turn. Not atomic: ids that succeed
    /// stay updated even when others fail.
    pub fn bulk_update_tasks(&mut self, ids: &[i64], update: TaskUpdate) -> Result<()> {
        if ids.is_empty() {
            return Err(Error::validation("no task ids given"));
        }
        let update = self.shape_update(update)?;
        let mut failures = Vec::new();
        for &id in ids {
            if let Err(error) = self.service.update_task(id, &update) {
                log::warn!("bulk update of task {id} failed: {error}");
                failures.push(BulkFailure { id, error });
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(BulkUpdateError { failures }.into())
        }
    }
}
