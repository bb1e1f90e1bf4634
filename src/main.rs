mod cli;
mod logging;
mod tui;
mod watch;

use anyhow::{bail, Context, Result};
use clap::Parser;

use cli::{Cli, Command, EditFields};
use taskdesk::calendar::{parse_due_date, SystemClock};
use taskdesk::config::Config;
use taskdesk::db;
use taskdesk::model::{Priority, SortField, SortOrder, Status, TaskFilter, TaskSort};
use taskdesk::output;
use taskdesk::shell::App;
use taskdesk::store::SqliteStore;

type Desk = App<SqliteStore, SystemClock>;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

/// Offline mode is for the interactive UI; one-shot commands fail loudly.
fn connect(config: &Config) -> Result<Desk> {
    let desk = App::start(config);
    if desk.is_offline() {
        bail!("database {} is unavailable", config.db_path.display());
    }
    Ok(desk)
}

fn connected<T>(value: Option<T>) -> Result<T> {
    value.context("database is unavailable")
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn edit_args(fields: &EditFields) -> [&str; 5] {
    [
        fields.title.as_deref().unwrap_or(""),
        fields.desc.as_deref().unwrap_or(""),
        fields.status.as_deref().unwrap_or(""),
        fields.priority.as_deref().unwrap_or(""),
        fields.due.as_deref().unwrap_or(""),
    ]
}

/// Typed filter for `list --from/--to`, which the string interface lacks.
fn range_filter(
    status: &str,
    priority: &str,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<TaskFilter> {
    let any = |s: &str| s.is_empty() || s == "all";
    Ok(TaskFilter {
        status: if any(status) { None } else { Some(Status::parse(status)?) },
        priority: if any(priority) { None } else { Some(Priority::parse(priority)?) },
        due_from: from.map(parse_due_date).transpose()?,
        due_to: to.map(parse_due_date).transpose()?,
    })
}

fn doctor(config: &Config) -> Result<()> {
    println!("environment: {}", config.environment);
    println!("database:    {}", config.db_path.display());
    println!("log filter:  {}", config.log_filter);
    match &config.log_file {
        Some(path) => println!("log file:    {}", path.display()),
        None => println!("log file:    (stderr)"),
    }

    db::ensure_parent_dir(&config.db_path)?;
    let conn = db::open(&config.db_path, config.busy_timeout)?;
    db::health(&conn)?;
    let version = db::schema_version(&conn)?;
    let latest = db::latest_version();
    println!("schema:      version {version} of {latest}");
    if version < latest {
        println!("             {} migration(s) pending; run any command to apply", latest - version);
    }
    println!("status:      ok");
    Ok(())
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(db) = cli.db {
        config = config.with_db_path(db);
    }
    if let Some(log_file) = cli.log_file {
        config = config.with_log_file(log_file);
    }

    // Without a log file the UI would draw over its own log lines
    if !matches!(cli.command, Command::Ui { .. }) || config.log_file.is_some() {
        logging::init(&config)?;
    }
    log::info!("taskdesk starting ({} environment)", config.environment);

    match cli.command {
        Command::Add {
            title,
            desc,
            priority,
            due,
            json,
        } => {
            let mut desk = connect(&config)?;
            let task = connected(desk.create_task(&title, &desc, &priority, &due)?)?;
            if json {
                print_json(&task)?;
            } else {
                println!("{}", task.id);
            }
            eprintln!("Added task #{} '{}'", task.id, task.title);
        }

        Command::List {
            status,
            priority,
            sort,
            order,
            from,
            to,
            json,
        } => {
            let desk = connect(&config)?;
            let tasks = if from.is_some() || to.is_some() {
                let filter = range_filter(&status, &priority, from.as_deref(), to.as_deref())?;
                let sort = if sort.is_empty() {
                    None
                } else {
                    Some(TaskSort {
                        field: SortField::parse(&sort)?,
                        order: SortOrder::parse_lenient(&order),
                    })
                };
                desk.list_tasks(&filter, sort.as_ref())?
            } else {
                desk.get_tasks(&status, &priority, &sort, &order)?
            };
            if json {
                print_json(&tasks)?;
            } else {
                print!("{}", output::format_task_list(&tasks));
            }
        }

        Command::Show { id, json } => {
            let desk = connect(&config)?;
            let task = connected(desk.get_task(id)?)?;
            if json {
                print_json(&task)?;
            } else {
                print!("{}", output::format_task_detail(&task));
            }
        }

        Command::Edit { id, fields, json } => {
            let mut desk = connect(&config)?;
            let [title, desc, status, priority, due] = edit_args(&fields);
            let task = connected(desk.update_task(id, title, desc, status, priority, due)?)?;
            if json {
                print_json(&task)?;
            }
            eprintln!("Updated task #{id}");
        }

        Command::Rm { id } => {
            let mut desk = connect(&config)?;
            desk.delete_task(id)?;
            eprintln!("Removed task #{id}");
        }

        Command::Toggle { id, json } => {
            let mut desk = connect(&config)?;
            let task = connected(desk.toggle_task_complete(id)?)?;
            if json {
                print_json(&task)?;
            }
            eprintln!("Marked task #{id} as {}", task.status);
        }

        Command::Dashboard { json } => {
            let desk = connect(&config)?;
            let dashboard = desk.get_dashboard_data()?;
            if json {
                print_json(&dashboard)?;
            } else {
                print!("{}", output::format_dashboard(&dashboard));
            }
        }

        Command::Search { query, json } => {
            let desk = connect(&config)?;
            let tasks = desk.search_tasks(&query)?;
            if json {
                print_json(&tasks)?;
            } else {
                print!("{}", output::format_task_list(&tasks));
            }
        }

        Command::Due { filter, json } => {
            let desk = connect(&config)?;
            let tasks = desk.get_tasks_by_date_filter(&filter)?;
            if json {
                print_json(&tasks)?;
            } else {
                print!("{}", output::format_task_list(&tasks));
            }
        }

        Command::BulkEdit { ids, fields } => {
            let mut desk = connect(&config)?;
            let [title, desc, status, priority, due] = edit_args(&fields);
            desk.bulk_update_tasks(&ids, title, desc, status, priority, due)?;
            eprintln!("Updated {} tasks", ids.len());
        }

        Command::Stats { json } => {
            let desk = connect(&config)?;
            let stats = desk.get_task_stats()?;
            if json {
                print_json(&stats)?;
            } else {
                print!("{}", output::format_stats(&stats));
            }
        }

        Command::Doctor => doctor(&config)?,

        Command::Ui { poll_interval } => {
            let mut desk = App::start(&config);
            tui::run(&mut desk, &config.db_path, poll_interval)?;
        }
    }

    Ok(())
}
