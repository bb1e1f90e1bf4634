use crate::calendar::{day_window, week_window, Clock};
use crate::error::{Error, Result};
use crate::model::{
    DateFilter, NewTask, Status, Task, TaskFilter, TaskSort, TaskStats, TaskUpdate,
};
use crate::store::TaskStore;
use crate::validate::{validate_new_task, validate_update};

/// Validation and mutation rules on top of a [`TaskStore`].
pub struct TaskService<S, C> {
    store: S,
    clock: C,
}

/// Tally statuses in one pass. Overdue is counted among pending tasks only.
pub fn compute_stats(tasks: &[Task], now: chrono::DateTime<chrono::Utc>) -> TaskStats {
    let mut stats = TaskStats {
        total: tasks.len(),
        ..Default::default()
    };
    for task in tasks {
        match task.status {
            Status::Pending => {
                stats.pending += 1;
                if task.is_overdue(now) {
                    stats.overdue += 1;
                }
            }
            Status::Completed => stats.completed += 1,
        }
    }
    stats
}

impl<S: TaskStore, C: Clock> TaskService<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn create_task(&mut self, mut task: NewTask) -> Result<Task> {
        validate_new_task(&task)?;
        task.priority = Some(task.priority.unwrap_or_default());
        let created = self.store.create(&task, self.clock.now_utc())?;
        log::debug!("created task {} '{}'", created.id, created.title);
        Ok(created)
    }

    pub fn get_task(&self, id: i64) -> Result<Task> {
        if id <= 0 {
            return Err(Error::NotFound(id));
        }
        self.store.get(id)?.ok_or(Error::NotFound(id))
    }

    /// Filter is conjunctive; sort defaults to newest first.
    pub fn get_all_tasks(
        &self,
        filter: Option<&TaskFilter>,
        sort: Option<&TaskSort>,
    ) -> Result<Vec<Task>> {
        self.store.list(filter, sort)
    }

    pub fn update_task(&mut self, id: i64, update: &TaskUpdate) -> Result<Task> {
        if id <= 0 {
            return Err(Error::NotFound(id));
        }
        validate_update(update)?;
        if !self.store.update(id, update, self.clock.now_utc())? {
            return Err(Error::NotFound(id));
        }
        if update.is_empty() {
            log::debug!("touched task {id}");
        } else {
            log::debug!("updated task {id}");
        }
        self.get_task(id)
    }

    pub fn delete_task(&mut self, id: i64) -> Result<()> {
        if id <= 0 || !self.store.delete(id)? {
            return Err(Error::NotFound(id));
        }
        log::debug!("deleted task {id}");
        Ok(())
    }

    /// Flip pending ⇄ completed.
    pub fn toggle_task_status(&mut self, id: i64) -> Result<Task> {
        let task = self.get_task(id)?;
        let update = TaskUpdate {
            status: Some(task.status.toggled()),
            ..Default::default()
        };
        self.update_task(id, &update)
    }

    pub fn get_overdue_tasks(&self) -> Result<Vec<Task>> {
        self.store.overdue(self.clock.now_utc())
    }

    /// Tasks in a named bucket: "today", "week", or "overdue".
    pub fn get_tasks_by_date_filter(&self, name: &str) -> Result<Vec<Task>> {
        self.get_tasks_in_bucket(DateFilter::parse(name)?)
    }

    pub fn get_tasks_in_bucket(&self, bucket: DateFilter) -> Result<Vec<Task>> {
        let now = self.clock.now();
        let (from, to) = match bucket {
            DateFilter::Today => day_window(now),
            DateFilter::Week => week_window(now),
            DateFilter::Overdue => return self.get_overdue_tasks(),
        };
        self.store.due_between(from, to)
    }

    pub fn get_task_stats(&self) -> Result<TaskStats> {
        let tasks = self.store.list(None, None)?;
        Ok(compute_stats(&tasks, self.clock.now_utc()))
    }
}
