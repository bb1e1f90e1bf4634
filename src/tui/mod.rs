mod app;
mod event;
mod view;

use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self as ct_event, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::prelude::*;

use crate::watch;
use app::App;
use event::KeyAction;
use taskdesk::calendar::Clock;
use taskdesk::shell::App as Desk;
use taskdesk::store::TaskStore;

pub fn run<S: TaskStore, C: Clock>(
    desk: &mut Desk<S, C>,
    db_path: &Path,
    poll_interval: u64,
) -> Result<()> {
    let mut app = App::new(desk)?;

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app, desk, db_path, poll_interval);

    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}

fn run_loop<S: TaskStore, C: Clock>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    desk: &mut Desk<S, C>,
    db_path: &Path,
    poll_interval: u64,
) -> Result<()> {
    let poll_duration = Duration::from_millis(poll_interval);

    // Offline there is no file worth watching
    let watcher = if desk.is_offline() {
        None
    } else {
        Some(watch::watch_db(db_path)?)
    };

    loop {
        terminal.draw(|frame| view::render(frame, app))?;

        if ct_event::poll(poll_duration)? {
            if let Event::Key(key) = ct_event::read()? {
                if key.kind == KeyEventKind::Press {
                    match event::handle_key(app, key) {
                        KeyAction::Quit => {
                            log::info!("ui closed");
                            return Ok(());
                        }
                        KeyAction::Submit => app.submit_add(desk)?,
                        KeyAction::Toggle => app.toggle_selected(desk)?,
                        KeyAction::Delete => app.confirm_delete(desk)?,
                        KeyAction::ApplySearch => app.apply_search(desk)?,
                        KeyAction::ClearSearch => app.clear_search(desk)?,
                        KeyAction::Refresh | KeyAction::Continue => app.refresh(desk)?,
                    }
                }
            }
        }

        if let Some((_, rx)) = &watcher {
            if watch::changed(rx) {
                app.refresh(desk)?;
            }
        }
    }
}
