use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};

use anyhow::{Context, Result};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

/// Whether `path` is the database file or one of its `-wal`/`-shm`/`-journal`
/// companions.
fn touches_db(path: &Path, db_file: &str) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name.strip_prefix(db_file).is_some_and(|rest| {
            rest.is_empty() || rest == "-wal" || rest == "-shm" || rest == "-journal"
        }))
}

/// Watch the database for changes. The returned watcher must be kept alive
/// for events to arrive; each relevant event sends one `()`.
pub fn watch_db(db_path: &Path) -> Result<(RecommendedWatcher, Receiver<()>)> {
    let (tx, rx) = mpsc::channel();
    let db_file = db_path
        .file_name()
        .and_then(|n| n.to_str())
        .context("database path has no file name")?
        .to_string();

    let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
        if let Ok(event) = res {
            if event.paths.iter().any(|p| touches_db(p, &db_file)) {
                // Receiver gone means the UI is shutting down
                let _ = tx.send(());
            }
        }
    })
    .context("failed to create file watcher")?;

    // SQLite writes through sibling files, so watch the directory
    let watch_path: PathBuf = match db_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    watcher
        .watch(&watch_path, RecursiveMode::NonRecursive)
        .with_context(|| format!("failed to watch {}", watch_path.display()))?;

    Ok((watcher, rx))
}

/// Drain pending events. Returns true if there were any.
pub fn changed(rx: &Receiver<()>) -> bool {
    let mut any = false;
    while rx.try_recv().is_ok() {
        any = true;
    }
    any
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_sqlite_companion_files() {
        assert!(touches_db(Path::new("/d/tasks.db"), "tasks.db"));
        assert!(touches_db(Path::new("/d/tasks.db-wal"), "tasks.db"));
        assert!(touches_db(Path::new("/d/tasks.db-shm"), "tasks.db"));
        assert!(!touches_db(Path::new("/d/tasks.db.bak"), "tasks.db"));
        assert!(!touches_db(Path::new("/d/notes.txt"), "tasks.db"));
    }

    #[test]
    fn changed_drains_channel() {
        let (tx, rx) = mpsc::channel();
        assert!(!changed(&rx));
        tx.send(()).unwrap();
        tx.send(()).unwrap();
        assert!(changed(&rx));
        assert!(!changed(&rx));
    }
}
