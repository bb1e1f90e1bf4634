use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "taskdesk", version, about = "Personal task manager")]
pub struct Cli {
    /// Path to the SQLite database [default: ~/.taskdesk/taskdesk.db]
    #[arg(long, env = "TASKDESK_DB", global = true)]
    pub db: Option<PathBuf>,

    /// Append logs to this file instead of stderr
    #[arg(long, env = "TASKDESK_LOG_FILE", global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Fields shared by `edit` and `bulk-edit`. Omitted fields are left alone.
#[derive(Args, Debug, Default)]
pub struct EditFields {
    /// New title
    #[arg(short, long)]
    pub title: Option<String>,
    /// New description
    #[arg(short, long)]
    pub desc: Option<String>,
    /// New status (pending, completed)
    #[arg(short, long)]
    pub status: Option<String>,
    /// New priority (low, medium, high)
    #[arg(short, long)]
    pub priority: Option<String>,
    /// New due date, YYYY-MM-DDTHH:MM:SSZ
    #[arg(long)]
    pub due: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Add a task
    Add {
        /// Task title
        title: String,
        /// Task description
        #[arg(short, long, default_value = "")]
        desc: String,
        /// Priority (low, medium, high) [default: medium]
        #[arg(short, long, default_value = "")]
        priority: String,
        /// Due date, YYYY-MM-DDTHH:MM:SSZ
        #[arg(long, default_value = "")]
        due: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List tasks
    List {
        /// Filter by status (pending, completed, all)
        #[arg(long, default_value = "all")]
        status: String,
        /// Filter by priority (low, medium, high, all)
        #[arg(long, default_value = "all")]
        priority: String,
        /// Sort field (created_at, due_date, priority)
        #[arg(long, default_value = "")]
        sort: String,
        /// Sort order (asc, desc)
        #[arg(long, default_value = "desc")]
        order: String,
        /// Only tasks due at or after this time
        #[arg(long)]
        from: Option<String>,
        /// Only tasks due at or before this time
        #[arg(long)]
        to: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show task details
    Show {
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit a task
    Edit {
        id: i64,
        #[command(flatten)]
        fields: EditFields,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove a task
    Rm { id: i64 },

    /// Flip a task between pending and completed
    Toggle {
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Stats plus overdue, today, upcoming and recent tasks
    Dashboard {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Find tasks whose title or description contains the query
    Search {
        query: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Tasks due today, this week, or overdue
    Due {
        /// today, week, or overdue
        filter: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply the same edit to several tasks
    BulkEdit {
        /// Task ids
        #[arg(required = true)]
        ids: Vec<i64>,
        #[command(flatten)]
        fields: EditFields,
    },

    /// Task counts
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check configuration and database health
    Doctor,

    /// Launch interactive dashboard
    Ui {
        /// Poll interval in milliseconds
        #[arg(long, default_value = "1000")]
        poll_interval: u64,
    },
}
