use crate::calendar::format_due_date;
use crate::model::TaskStats;
use crate::shell::{DashboardView, TaskView};

fn due_label(task: &TaskView) -> String {
    match task.due_date {
        Some(due) if task.is_overdue => format!("  due {} (overdue)", format_due_date(due)),
        Some(due) => format!("  due {}", format_due_date(due)),
        None => String::new(),
    }
}

pub fn format_task_line(task: &TaskView) -> String {
    format!(
        "{} #{:<4} [{:<6}] {}{}",
        task.status.icon(),
        task.id,
        task.priority.as_str(),
        task.title,
        due_label(task)
    )
}

pub fn format_task_list(tasks: &[TaskView]) -> String {
    let mut out = String::new();
    for task in tasks {
        out.push_str(&format_task_line(task));
        out.push('\n');
    }
    out
}

pub fn format_task_detail(task: &TaskView) -> String {
    let mut out = String::new();
    out.push_str(&format!("Id:          {}\n", task.id));
    out.push_str(&format!("Title:       {}\n", task.title));
    out.push_str(&format!("Status:      {}\n", task.status));
    out.push_str(&format!("Priority:    {}\n", task.priority));
    if let Some(due) = task.due_date {
        let flag = if task.is_overdue { " (overdue)" } else { "" };
        out.push_str(&format!("Due:         {}{flag}\n", format_due_date(due)));
    }
    if !task.description.is_empty() {
        out.push_str(&format!("Description: {}\n", task.description));
    }
    out.push_str(&format!("Created:     {}\n", task.created_at.to_rfc3339()));
    out.push_str(&format!("Updated:     {}\n", task.updated_at.to_rfc3339()));
    out
}

pub fn format_stats(stats: &TaskStats) -> String {
    format!(
        "{} total, {} pending, {} completed, {} overdue\n",
        stats.total, stats.pending, stats.completed, stats.overdue
    )
}

fn push_section(out: &mut String, heading: &str, tasks: &[TaskView]) {
    out.push('\n');
    out.push_str(&format!("{heading} ({})\n", tasks.len()));
    if tasks.is_empty() {
        out.push_str("  (none)\n");
    }
    for task in tasks {
        out.push_str("  ");
        out.push_str(&format_task_line(task));
        out.push('\n');
    }
}

pub fn format_dashboard(dashboard: &DashboardView) -> String {
    let mut out = format_stats(&dashboard.stats);
    push_section(&mut out, "Overdue", &dashboard.overdue_tasks);
    push_section(&mut out, "Today", &dashboard.today_tasks);
    push_section(&mut out, "Upcoming this week", &dashboard.upcoming_tasks);
    push_section(&mut out, "Recently added", &dashboard.recent_tasks);
    out
}
