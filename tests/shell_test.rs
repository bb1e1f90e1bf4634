use std::path::Path;

use chrono::{DateTime, FixedOffset, TimeZone};
use tempfile::TempDir;

use taskdesk::calendar::FixedClock;
use taskdesk::config::Config;
use taskdesk::model::{Priority, Status};
use taskdesk::shell::App;
use taskdesk::store::SqliteStore;
use taskdesk::Error;

type Desk = App<SqliteStore, FixedClock>;

// Wednesday 2025-03-12 10:00 UTC
fn wednesday() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2025, 3, 12, 10, 0, 0)
        .unwrap()
}

fn config(db_path: &Path) -> Config {
    Config::from_lookup(|_| None).unwrap().with_db_path(db_path)
}

fn open(dir: &TempDir) -> (Desk, FixedClock) {
    let clock = FixedClock::new(wednesday());
    let desk = App::start_with_clock(&config(&dir.path().join("tasks.db")), clock.clone());
    assert!(!desk.is_offline());
    (desk, clock)
}

#[test]
fn tasks_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let (mut desk, _) = open(&dir);
    let created = desk
        .create_task("Write report", "quarterly numbers", "high", "2025-03-14T17:00:00Z")
        .unwrap()
        .unwrap();
    assert_eq!(created.status, Status::Pending);
    drop(desk);

    let (desk, _) = open(&dir);
    let fetched = desk.get_task(created.id).unwrap().unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fetched.priority, Priority::High);
}

#[test]
fn creates_missing_database_directory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("deeper").join("tasks.db");
    let desk = App::start_with_clock(&config(&path), FixedClock::new(wednesday()));
    assert!(!desk.is_offline());
    assert!(path.exists());
}

#[test]
fn past_due_date_leaves_database_unchanged() {
    let dir = TempDir::new().unwrap();
    let (mut desk, _) = open(&dir);
    let err = desk
        .create_task("too late", "", "", "2025-03-12T09:59:59Z")
        .unwrap_err();
    assert!(err.is_validation());
    assert!(desk.get_tasks("all", "all", "", "").unwrap().is_empty());
    assert_eq!(desk.get_task_stats().unwrap().total, 0);
}

#[test]
fn malformed_due_date_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (mut desk, _) = open(&dir);
    let err = desk.create_task("t", "", "", "next friday").unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn five_digit_year_is_rejected_and_reads_keep_working() {
    let dir = TempDir::new().unwrap();
    let (mut desk, _) = open(&dir);
    desk.create_task("near", "", "", "2025-03-20T00:00:00Z").unwrap();

    for due in ["+10000-01-01T00:00:00Z", "10000-01-01T00:00:00Z", "+2030-01-01T00:00:00Z"] {
        let err = desk.create_task("far", "", "", due).unwrap_err();
        assert!(err.is_validation(), "{due}: {err}");
        let err = desk.update_task(1, "", "", "", "", due).unwrap_err();
        assert!(err.is_validation(), "{due}: {err}");
    }

    let tasks = desk.get_tasks("all", "all", "due_date", "asc").unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(desk.get_dashboard_data().unwrap().stats.total, 1);
    assert!(desk.get_tasks_by_date_filter("overdue").unwrap().is_empty());

    let latest = desk
        .create_task("last moment", "", "", "9999-12-31T23:59:59Z")
        .unwrap()
        .unwrap();
    assert!(!latest.is_overdue);
    assert!(desk.get_tasks_by_date_filter("overdue").unwrap().is_empty());
}

#[test]
fn empty_update_touches_only_timestamp() {
    let dir = TempDir::new().unwrap();
    let (mut desk, clock) = open(&dir);
    let task = desk.create_task("keep me", "as is", "low", "").unwrap().unwrap();

    clock.advance(chrono::Duration::seconds(30));
    let touched = desk.update_task(task.id, "", "", "", "", "").unwrap().unwrap();
    assert_eq!(touched.title, "keep me");
    assert_eq!(touched.description, "as is");
    assert_eq!(touched.priority, Priority::Low);
    assert!(touched.updated_at > task.updated_at);

    let err = desk.update_task(999, "", "", "", "", "").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn bulk_update_partial_failure() {
    let dir = TempDir::new().unwrap();
    let (mut desk, _) = open(&dir);
    let first = desk.create_task("first", "", "low", "").unwrap().unwrap();
    assert_eq!(first.id, 1);

    let err = desk
        .bulk_update_tasks(&[1, 999], "", "", "completed", "", "")
        .unwrap_err();
    match &err {
        Error::BulkUpdate(bulk) => assert_eq!(bulk.failed_ids(), vec![999]),
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("task 999"));
    let first = desk.get_task(1).unwrap().unwrap();
    assert_eq!(first.status, Status::Completed);
}

#[test]
fn dashboard_buckets_do_not_overlap() {
    let dir = TempDir::new().unwrap();
    let (mut desk, clock) = open(&dir);
    desk.create_task("due soon", "", "", "2025-03-12T11:00:00Z").unwrap();
    desk.create_task("tonight", "", "", "2025-03-12T23:59:59Z").unwrap();
    desk.create_task("thursday", "", "", "2025-03-13T00:00:00Z").unwrap();
    desk.create_task("sunday", "", "", "2025-03-16T20:00:00Z").unwrap();
    desk.create_task("next monday", "", "", "2025-03-17T00:00:00Z").unwrap();
    desk.create_task("someday", "", "", "").unwrap();
    clock.advance(chrono::Duration::hours(2));

    let dash = desk.get_dashboard_data().unwrap();
    let titles = |tasks: &[taskdesk::shell::TaskView]| -> Vec<String> {
        tasks.iter().map(|t| t.title.clone()).collect()
    };
    assert_eq!(titles(&dash.today_tasks), vec!["due soon", "tonight"]);
    assert_eq!(titles(&dash.upcoming_tasks), vec!["thursday", "sunday"]);
    assert_eq!(titles(&dash.overdue_tasks), vec!["due soon"]);
    assert!(dash.overdue_tasks[0].is_overdue);
    assert_eq!(dash.recent_tasks.len(), 5);
    assert_eq!(dash.stats.total, 6);
    assert_eq!(dash.stats.overdue, 1);

    let today = desk.get_tasks_by_date_filter("today").unwrap();
    assert_eq!(titles(&today), titles(&dash.today_tasks));
    assert!(desk.get_tasks_by_date_filter("fortnight").is_err());
}

#[test]
fn search_matches_title_or_description() {
    let dir = TempDir::new().unwrap();
    let (mut desk, _) = open(&dir);
    desk.create_task("Grocery run", "", "", "").unwrap();
    desk.create_task("Errands", "pick up the GROCERY order", "", "").unwrap();
    desk.create_task("Laundry", "", "", "").unwrap();

    let found = desk.search_tasks("grocery").unwrap();
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|t| t.title != "Laundry"));
    assert!(desk.search_tasks("  ").unwrap_err().is_validation());
}

#[test]
fn update_toggle_delete_roundtrip() {
    let dir = TempDir::new().unwrap();
    let (mut desk, clock) = open(&dir);
    let task = desk.create_task("draft", "", "", "").unwrap().unwrap();

    clock.advance(chrono::Duration::seconds(10));
    let updated = desk
        .update_task(task.id, "final", "", "", "low", "")
        .unwrap()
        .unwrap();
    assert_eq!(updated.title, "final");
    assert_eq!(updated.priority, Priority::Low);
    assert!(updated.updated_at > task.updated_at);

    let toggled = desk.toggle_task_complete(task.id).unwrap().unwrap();
    assert_eq!(toggled.status, Status::Completed);
    assert_eq!(desk.get_tasks("completed", "", "", "").unwrap().len(), 1);

    desk.delete_task(task.id).unwrap();
    assert!(desk.get_task(task.id).unwrap_err().is_not_found());
    assert!(desk.delete_task(task.id).unwrap_err().is_not_found());
}

#[test]
fn unopenable_database_runs_offline() {
    let dir = TempDir::new().unwrap();
    // A regular file where the database directory should be
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"").unwrap();
    let mut desk = App::start_with_clock(
        &config(&blocker.join("tasks.db")),
        FixedClock::new(wednesday()),
    );
    assert!(desk.is_offline());
    assert_eq!(desk.create_task("t", "", "", "").unwrap(), None);
    assert!(desk.get_tasks("", "", "", "").unwrap().is_empty());
    assert_eq!(desk.get_dashboard_data().unwrap().stats.total, 0);
    desk.bulk_update_tasks(&[1], "x", "", "", "", "").unwrap();
}
