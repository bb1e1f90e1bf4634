use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Tabs};

use super::app::{AddField, App, Mode, Tab};
use taskdesk::calendar::format_due_date;
use taskdesk::model::{Priority, Status};
use taskdesk::shell::TaskView;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_tabs(frame, app, chunks[0]);
    match app.tab {
        Tab::Dashboard => render_dashboard(frame, app, chunks[1]),
        Tab::Tasks => render_tasks(frame, app, chunks[1]),
    }
    render_status_line(frame, app, chunks[2]);

    match app.mode {
        Mode::Help => render_help(frame),
        Mode::ConfirmDelete(id) => render_confirm_delete(frame, app, id),
        Mode::Search | Mode::Normal => {}
    }
    if app.add_form.is_some() {
        render_add_dialog(frame, app);
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let selected = match app.tab {
        Tab::Dashboard => 0,
        Tab::Tasks => 1,
    };
    let title = if app.offline {
        " taskdesk (offline) "
    } else {
        " taskdesk "
    };
    let tabs = Tabs::new(vec![" Dashboard ", " Tasks "])
        .select(selected)
        .highlight_style(Style::default().fg(Color::Cyan).bold())
        .divider("|");
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(title.len() as u16), Constraint::Min(0)])
        .split(area);
    frame.render_widget(Paragraph::new(title).style(Style::default().bold()), chunks[0]);
    frame.render_widget(tabs, chunks[1]);
}

fn task_line(task: &TaskView) -> Line<'static> {
    let status_style = match task.status {
        Status::Pending => Style::default().fg(Color::Yellow),
        Status::Completed => Style::default().fg(Color::DarkGray),
    };
    let priority_style = match task.priority {
        Priority::High => Style::default().fg(Color::Red),
        Priority::Medium => Style::default().fg(Color::Yellow),
        Priority::Low => Style::default().fg(Color::Green),
    };
    let due = match task.due_date {
        Some(due) => format!("  {}", format_due_date(due)),
        None => String::new(),
    };
    let due_style = if task.is_overdue {
        Style::default().fg(Color::Red).bold()
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Line::from(vec![
        Span::styled(format!("{} ", task.status.icon()), status_style),
        Span::styled(format!("{:<6} ", task.priority.as_str()), priority_style),
        Span::styled(task.title.clone(), Style::default().bold()),
        Span::styled(due, due_style),
    ])
}

fn task_list<'a>(title: String, tasks: &[TaskView], cursor: Option<usize>) -> List<'a> {
    let items: Vec<ListItem> = tasks
        .iter()
        .enumerate()
        .map(|(i, task)| {
            let item = ListItem::new(task_line(task));
            if Some(i) == cursor {
                item.style(Style::default().bg(Color::DarkGray))
            } else {
                item
            }
        })
        .collect();
    List::new(items).block(Block::default().borders(Borders::ALL).title(title))
}

fn render_dashboard(frame: &mut Frame, app: &App, area: Rect) {
    let dash = &app.dashboard;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Percentage(50),
            Constraint::Percentage(50),
        ])
        .split(area);

    let stats = Line::from(vec![
        Span::raw(format!("Total {}   ", dash.stats.total)),
        Span::styled(
            format!("Pending {}   ", dash.stats.pending),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(
            format!("Completed {}   ", dash.stats.completed),
            Style::default().fg(Color::Green),
        ),
        Span::styled(
            format!("Overdue {}", dash.stats.overdue),
            Style::default().fg(Color::Red),
        ),
    ]);
    frame.render_widget(
        Paragraph::new(stats).block(Block::default().borders(Borders::ALL).title(" Stats ")),
        rows[0],
    );

    let halves = |area: Rect| {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area)
    };
    let top = halves(rows[1]);
    let bottom = halves(rows[2]);
    let sections = [
        (" Overdue ", &dash.overdue_tasks, top[0]),
        (" Today ", &dash.today_tasks, top[1]),
        (" This week ", &dash.upcoming_tasks, bottom[0]),
        (" Recent ", &dash.recent_tasks, bottom[1]),
    ];
    for (title, tasks, area) in sections {
        frame.render_widget(task_list(format!("{title}({}) ", tasks.len()), tasks, None), area);
    }
}

fn render_tasks(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(" Tasks ({}) [{}] ", app.rows.len(), app.list_summary());
    frame.render_widget(task_list(title, &app.rows, Some(app.cursor)), area);
}

fn render_status_line(frame: &mut Frame, app: &App, area: Rect) {
    let line = if app.mode == Mode::Search {
        Paragraph::new(format!("/{}_", app.search_input)).style(Style::default().fg(Color::Cyan))
    } else if let Some(err) = &app.error {
        Paragraph::new(err.as_str()).style(Style::default().fg(Color::Red))
    } else {
        Paragraph::new("Tab: switch  space: toggle  d: delete  a: add  /: search  ?: help  q: quit")
            .style(Style::default().fg(Color::DarkGray))
    };
    frame.render_widget(line, area);
}

fn render_confirm_delete(frame: &mut Frame, app: &App, id: i64) {
    let title = app
        .rows
        .iter()
        .find(|t| t.id == id)
        .map_or_else(|| format!("#{id}"), |t| format!("'{}'", t.title));
    let term = frame.area();
    let width = 50.min(term.width.saturating_sub(4));
    let area = centered_rect(width, 4, term);
    frame.render_widget(Clear, area);
    let text = vec![
        Line::raw(format!("Delete {title}?")),
        Line::styled("y: delete  any other key: cancel", Style::default().fg(Color::DarkGray)),
    ];
    frame.render_widget(
        Paragraph::new(text).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Delete ")
                .border_style(Style::default().fg(Color::Red)),
        ),
        area,
    );
}

fn render_field(
    frame: &mut Frame,
    label: &str,
    value: &str,
    focused: bool,
    chunks: &[Rect],
    idx: &mut usize,
) {
    let label_style = if focused {
        Style::default().fg(Color::Cyan).bold()
    } else {
        Style::default()
    };
    frame.render_widget(Paragraph::new(label).style(label_style), chunks[*idx]);
    *idx += 1;

    let cursor = if focused { "_" } else { "" };
    frame.render_widget(
        Paragraph::new(format!("  {value}{cursor}")).style(Style::default().fg(Color::White)),
        chunks[*idx],
    );
    *idx += 1;
}

fn render_add_dialog(frame: &mut Frame, app: &App) {
    let Some(form) = &app.add_form else {
        return;
    };

    let term = frame.area();
    let width = 60.min(term.width.saturating_sub(4));
    let content_rows: u16 = 9 + u16::from(form.error.is_some());
    let height = (content_rows + 2).min(term.height.saturating_sub(2));
    let area = centered_rect(width, height, term);

    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Add Task ")
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut constraints = vec![Constraint::Length(1); 8];
    if form.error.is_some() {
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Length(1)); // hint
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let mut idx = 0;
    let fields = [
        ("Title:", &form.title, AddField::Title),
        ("Description:", &form.description, AddField::Description),
        ("Priority (low/medium/high):", &form.priority, AddField::Priority),
        ("Due (YYYY-MM-DDTHH:MM:SSZ):", &form.due, AddField::Due),
    ];
    for (label, value, field) in fields {
        render_field(frame, label, value, form.focused == field, &chunks, &mut idx);
    }

    if let Some(err) = &form.error {
        frame.render_widget(
            Paragraph::new(err.as_str()).style(Style::default().fg(Color::Red)),
            chunks[idx],
        );
        idx += 1;
    }

    frame.render_widget(
        Paragraph::new("Enter: submit  Tab/S-Tab: fields  Esc: cancel  C-u: clear")
            .style(Style::default().fg(Color::DarkGray)),
        chunks[idx],
    );
}

fn render_help(frame: &mut Frame) {
    let term = frame.area();
    let width = 50.min(term.width.saturating_sub(4));
    let height = 20.min(term.height.saturating_sub(2));
    let area = centered_rect(width, height, term);

    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let key = |k: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("{k:<8}"), Style::default().fg(Color::Cyan)),
            Span::raw(what),
        ])
    };
    let help_text = vec![
        key("Tab", "Switch dashboard/tasks"),
        key("j/Down", "Move down"),
        key("k/Up", "Move up"),
        key("Space", "Toggle completed"),
        key("d", "Delete task (confirm with y)"),
        key("a", "Add task"),
        key("s", "Cycle status filter"),
        key("p", "Cycle priority filter"),
        key("o", "Cycle sort field"),
        key("r", "Reverse sort order"),
        key("/", "Search (Enter apply, Esc clear)"),
        key("?", "Toggle help"),
        key("q/Esc", "Quit"),
        Line::raw(""),
        Line::from(vec![Span::styled("Add Task Dialog:", Style::default().bold())]),
        key("  Tab", "Next field"),
        key("  Enter", "Submit"),
        key("  Esc", "Cancel"),
    ];

    frame.render_widget(Paragraph::new(help_text), inner);
}
