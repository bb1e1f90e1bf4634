use anyhow::Result;

use taskdesk::calendar::Clock;
use taskdesk::model::{Priority, SortField, SortOrder, Status, TaskFilter, TaskSort};
use taskdesk::shell::{App as Desk, DashboardView, TaskView};
use taskdesk::store::{compare_keys, TaskStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Tasks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Help,
    Search,
    ConfirmDelete(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddField {
    Title,
    Description,
    Priority,
    Due,
}

pub struct AddForm {
    pub title: String,
    pub description: String,
    pub priority: String,
    pub due: String,
    pub focused: AddField,
    pub error: Option<String>,
}

impl AddForm {
    pub fn new() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            priority: String::new(),
            due: String::new(),
            focused: AddField::Title,
            error: None,
        }
    }

    pub fn focused_buf_mut(&mut self) -> &mut String {
        match self.focused {
            AddField::Title => &mut self.title,
            AddField::Description => &mut self.description,
            AddField::Priority => &mut self.priority,
            AddField::Due => &mut self.due,
        }
    }

    pub fn next_field(&mut self) {
        self.focused = match self.focused {
            AddField::Title => AddField::Description,
            AddField::Description => AddField::Priority,
            AddField::Priority => AddField::Due,
            AddField::Due => AddField::Title,
        };
    }

    pub fn prev_field(&mut self) {
        self.focused = match self.focused {
            AddField::Title => AddField::Due,
            AddField::Description => AddField::Title,
            AddField::Priority => AddField::Description,
            AddField::Due => AddField::Priority,
        };
    }
}

pub struct App {
    pub tab: Tab,
    pub mode: Mode,
    pub rows: Vec<TaskView>,
    pub dashboard: DashboardView,
    pub cursor: usize,
    pub status_filter: Option<Status>,
    pub priority_filter: Option<Priority>,
    pub sort: TaskSort,
    /// Applied search query; empty means no search.
    pub search: String,
    pub search_input: String,
    pub add_form: Option<AddForm>,
    pub error: Option<String>,
    pub offline: bool,
}

impl App {
    pub fn new<S: TaskStore, C: Clock>(desk: &Desk<S, C>) -> Result<Self> {
        let mut app = App {
            tab: Tab::Dashboard,
            mode: Mode::Normal,
            rows: Vec::new(),
            dashboard: DashboardView::default(),
            cursor: 0,
            status_filter: None,
            priority_filter: None,
            sort: TaskSort::default(),
            search: String::new(),
            search_input: String::new(),
            add_form: None,
            error: None,
            offline: desk.is_offline(),
        };
        app.refresh(desk)?;
        Ok(app)
    }

    pub fn refresh<S: TaskStore, C: Clock>(&mut self, desk: &Desk<S, C>) -> Result<()> {
        self.dashboard = desk.get_dashboard_data()?;
        let filter = TaskFilter {
            status: self.status_filter,
            priority: self.priority_filter,
            ..Default::default()
        };
        self.rows = if self.search.is_empty() {
            desk.list_tasks(&filter, Some(&self.sort))?
        } else {
            let mut found = desk.search_tasks(&self.search)?;
            found.retain(|t| {
                filter.status.map_or(true, |s| s == t.status)
                    && filter.priority.map_or(true, |p| p == t.priority)
            });
            found.sort_by(|a, b| compare_keys(a.into(), b.into(), &self.sort));
            found
        };
        if self.rows.is_empty() {
            self.cursor = 0;
        } else if self.cursor >= self.rows.len() {
            self.cursor = self.rows.len() - 1;
        }
        Ok(())
    }

    pub fn switch_tab(&mut self) {
        self.tab = match self.tab {
            Tab::Dashboard => Tab::Tasks,
            Tab::Tasks => Tab::Dashboard,
        };
    }

    pub fn move_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn move_down(&mut self) {
        if !self.rows.is_empty() && self.cursor < self.rows.len() - 1 {
            self.cursor += 1;
        }
    }

    /// Only the task list has a selection.
    pub fn selected(&self) -> Option<&TaskView> {
        match self.tab {
            Tab::Tasks => self.rows.get(self.cursor),
            Tab::Dashboard => None,
        }
    }

    pub fn cycle_status_filter(&mut self) {
        self.status_filter = match self.status_filter {
            None => Some(Status::Pending),
            Some(Status::Pending) => Some(Status::Completed),
            Some(Status::Completed) => None,
        };
    }

    pub fn cycle_priority_filter(&mut self) {
        self.priority_filter = match self.priority_filter {
            None => Some(Priority::High),
            Some(Priority::High) => Some(Priority::Medium),
            Some(Priority::Medium) => Some(Priority::Low),
            Some(Priority::Low) => None,
        };
    }

    pub fn cycle_sort_field(&mut self) {
        self.sort.field = match self.sort.field {
            SortField::CreatedAt => SortField::DueDate,
            SortField::DueDate => SortField::Priority,
            SortField::Priority => SortField::CreatedAt,
        };
    }

    pub fn reverse_order(&mut self) {
        self.sort.order = match self.sort.order {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        };
    }

    pub fn toggle_selected<S: TaskStore, C: Clock>(&mut self, desk: &mut Desk<S, C>) -> Result<()> {
        let Some(id) = self.selected().map(|t| t.id) else {
            return Ok(());
        };
        self.error = None;
        if let Err(e) = desk.toggle_task_complete(id) {
            self.error = Some(e.to_string());
        }
        self.refresh(desk)
    }

    pub fn request_delete(&mut self) {
        if let Some(id) = self.selected().map(|t| t.id) {
            self.mode = Mode::ConfirmDelete(id);
        }
    }

    pub fn confirm_delete<S: TaskStore, C: Clock>(&mut self, desk: &mut Desk<S, C>) -> Result<()> {
        let Mode::ConfirmDelete(id) = self.mode else {
            return Ok(());
        };
        self.mode = Mode::Normal;
        self.error = None;
        if let Err(e) = desk.delete_task(id) {
            self.error = Some(e.to_string());
        }
        self.refresh(desk)
    }

    pub fn start_search(&mut self) {
        self.search_input = self.search.clone();
        self.mode = Mode::Search;
    }

    pub fn apply_search<S: TaskStore, C: Clock>(&mut self, desk: &Desk<S, C>) -> Result<()> {
        self.search = self.search_input.trim().to_string();
        self.mode = Mode::Normal;
        self.tab = Tab::Tasks;
        self.cursor = 0;
        self.refresh(desk)
    }

    pub fn clear_search<S: TaskStore, C: Clock>(&mut self, desk: &Desk<S, C>) -> Result<()> {
        self.search.clear();
        self.search_input.clear();
        self.mode = Mode::Normal;
        self.refresh(desk)
    }

    pub fn enter_add_mode(&mut self) {
        self.add_form = Some(AddForm::new());
    }

    pub fn cancel_add_mode(&mut self) {
        self.add_form = None;
    }

    pub fn submit_add<S: TaskStore, C: Clock>(&mut self, desk: &mut Desk<S, C>) -> Result<()> {
        let Some(form) = self.add_form.as_mut() else {
            return Ok(());
        };
        match desk.create_task(&form.title, &form.description, &form.priority, &form.due) {
            Ok(_) => {
                self.add_form = None;
                self.refresh(desk)
            }
            Err(e) => {
                form.error = Some(e.to_string());
                Ok(())
            }
        }
    }

    pub fn toggle_help(&mut self) {
        self.mode = match self.mode {
            Mode::Help => Mode::Normal,
            _ => Mode::Help,
        };
    }

    /// Short description of the active list settings for the title bar.
    pub fn list_summary(&self) -> String {
        let status = self.status_filter.map_or("all", |s| s.as_str());
        let priority = self.priority_filter.map_or("all", |p| p.as_str());
        let mut summary = format!(
            "status:{status} priority:{priority} sort:{} {}",
            self.sort.field.as_str(),
            self.sort.order.as_str()
        );
        if !self.search.is_empty() {
            summary.push_str(&format!(" search:\"{}\"", self.search));
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};
    use taskdesk::calendar::FixedClock;
    use taskdesk::service::TaskService;
    use taskdesk::store::MemoryStore;
    use taskdesk::usecase::TaskUsecase;

    fn desk() -> Desk<MemoryStore, FixedClock> {
        let now = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 3, 12, 10, 0, 0)
            .unwrap();
        let svc = TaskService::new(MemoryStore::new(), FixedClock::new(now));
        Desk::connected(TaskUsecase::new(svc))
    }

    #[test]
    fn filters_cycle_and_apply() {
        let mut desk = desk();
        desk.create_task("a", "", "high", "").unwrap();
        let b = desk.create_task("b", "", "low", "").unwrap().unwrap();
        desk.toggle_task_complete(b.id).unwrap();

        let mut app = App::new(&desk).unwrap();
        assert_eq!(app.rows.len(), 2);

        app.cycle_status_filter();
        app.refresh(&desk).unwrap();
        assert_eq!(app.rows.len(), 1);
        assert_eq!(app.rows[0].title, "a");

        app.cycle_status_filter();
        app.cycle_priority_filter();
        app.cycle_priority_filter();
        app.cycle_priority_filter();
        app.refresh(&desk).unwrap();
        assert_eq!(app.status_filter, Some(Status::Completed));
        assert_eq!(app.priority_filter, Some(Priority::Low));
        assert_eq!(app.rows.len(), 1);
        assert_eq!(app.rows[0].title, "b");
    }

    #[test]
    fn delete_needs_confirmation() {
        let mut desk = desk();
        desk.create_task("doomed", "", "", "").unwrap();
        let mut app = App::new(&desk).unwrap();

        // No selection on the dashboard tab
        app.request_delete();
        assert_eq!(app.mode, Mode::Normal);

        app.switch_tab();
        app.request_delete();
        assert!(matches!(app.mode, Mode::ConfirmDelete(_)));
        app.confirm_delete(&mut desk).unwrap();
        assert!(app.rows.is_empty());
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn add_form_reports_errors_inline() {
        let mut desk = desk();
        let mut app = App::new(&desk).unwrap();
        app.enter_add_mode();
        app.submit_add(&mut desk).unwrap();
        assert!(app.add_form.as_ref().unwrap().error.is_some());

        let form = app.add_form.as_mut().unwrap();
        form.title = "water plants".into();
        form.next_field();
        form.next_field();
        form.focused_buf_mut().push_str("high");
        app.submit_add(&mut desk).unwrap();
        assert!(app.add_form.is_none());
        assert_eq!(app.rows[0].priority, Priority::High);
        assert_eq!(app.dashboard.stats.total, 1);
    }

    #[test]
    fn search_narrows_rows() {
        let mut desk = desk();
        desk.create_task("Buy groceries", "", "", "").unwrap();
        desk.create_task("Walk dog", "", "", "").unwrap();
        let mut app = App::new(&desk).unwrap();
        app.start_search();
        app.search_input = "GROCER".into();
        app.apply_search(&desk).unwrap();
        assert_eq!(app.tab, Tab::Tasks);
        assert_eq!(app.rows.len(), 1);
        app.clear_search(&desk).unwrap();
        assert_eq!(app.rows.len(), 2);
    }

    #[test]
    fn search_results_follow_active_sort() {
        let mut desk = desk();
        desk.create_task("grocery bag", "", "medium", "").unwrap();
        desk.create_task("grocery run", "", "high", "").unwrap();
        desk.create_task("grocery list", "", "low", "").unwrap();
        desk.create_task("laundry", "", "high", "").unwrap();
        let mut app = App::new(&desk).unwrap();
        app.search_input = "grocery".into();
        app.apply_search(&desk).unwrap();

        app.cycle_sort_field();
        app.cycle_sort_field();
        assert_eq!(app.sort.field, SortField::Priority);
        app.refresh(&desk).unwrap();
        let titles: Vec<&str> = app.rows.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["grocery run", "grocery bag", "grocery list"]);

        app.reverse_order();
        app.refresh(&desk).unwrap();
        let titles: Vec<&str> = app.rows.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["grocery list", "grocery bag", "grocery run"]);
        assert!(app.list_summary().contains("sort:priority asc"));
    }
}
