use chrono::{DateTime, Utc};

use super::{compare, TaskStore};
use crate::error::Result;
use crate::model::{NewTask, Status, Task, TaskFilter, TaskSort, TaskUpdate};

/// In-memory task store for tests. Ids start at 1 and are never reused.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tasks: Vec<Task>,
    last_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(mut tasks: Vec<Task>, sort: &TaskSort) -> Vec<Task> {
        tasks.sort_by(|a, b| compare(a, b, sort));
        tasks
    }

    fn by_due_date(mut tasks: Vec<Task>) -> Vec<Task> {
        tasks.sort_by(|a, b| a.due_date.cmp(&b.due_date).then(a.id.cmp(&b.id)));
        tasks
    }
}

impl TaskStore for MemoryStore {
    fn create(&mut self, task: &NewTask, now: DateTime<Utc>) -> Result<Task> {
        self.last_id += 1;
        let stored = Task {
            id: self.last_id,
            title: task.title.clone(),
            description: task.description.clone(),
            status: Status::Pending,
            priority: task.priority.unwrap_or_default(),
            due_date: task.due_date,
            created_at: now,
            updated_at: now,
        };
        self.tasks.push(stored.clone());
        Ok(stored)
    }

    fn get(&self, id: i64) -> Result<Option<Task>> {
        Ok(self.tasks.iter().find(|t| t.id == id).cloned())
    }

    fn list(&self, filter: Option<&TaskFilter>, sort: Option<&TaskSort>) -> Result<Vec<Task>> {
        let matching: Vec<Task> = self
            .tasks
            .iter()
            .filter(|t| filter.map_or(true, |f| f.matches(t)))
            .cloned()
            .collect();
        Ok(Self::sorted(matching, &sort.copied().unwrap_or_default()))
    }

    fn update(&mut self, id: i64, update: &TaskUpdate, now: DateTime<Utc>) -> Result<bool> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        if let Some(title) = &update.title {
            task.title = title.clone();
        }
        if let Some(description) = &update.description {
            task.description = description.clone();
        }
        if let Some(status) = update.status {
            task.status = status;
        }
        if let Some(priority) = update.priority {
            task.priority = priority;
        }
        if let Some(due) = update.due_date {
            task.due_date = Some(due);
        }
        task.updated_at = task.updated_at.max(now);
        Ok(true)
    }

    fn delete(&mut self, id: i64) -> Result<bool> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        Ok(self.tasks.len() < before)
    }

    fn overdue(&self, now: DateTime<Utc>) -> Result<Vec<Task>> {
        let tasks = self
            .tasks
            .iter()
            .filter(|t| t.status == Status::Pending && t.due_date.is_some_and(|d| d < now))
            .cloned()
            .collect();
        Ok(Self::by_due_date(tasks))
    }

    fn due_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<Task>> {
        let tasks = self
            .tasks
            .iter()
            .filter(|t| t.due_date.is_some_and(|d| d >= from && d < to))
            .cloned()
            .collect();
        Ok(Self::by_due_date(tasks))
    }
}
