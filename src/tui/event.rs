use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Mode};

/// Result of handling a key press. Variants other than `Quit` and
/// `Continue` need the database and are carried out by the event loop.
#[derive(Debug, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Submit,
    Toggle,
    Delete,
    ApplySearch,
    ClearSearch,
    Refresh,
    Continue,
}

pub fn handle_key(app: &mut App, key: KeyEvent) -> KeyAction {
    if app.add_form.is_some() {
        return handle_add(app, key);
    }
    match app.mode {
        Mode::Search => handle_search(app, key),
        Mode::ConfirmDelete(_) => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => KeyAction::Delete,
            _ => {
                app.mode = Mode::Normal;
                KeyAction::Continue
            }
        },
        Mode::Help => {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::Esc) {
                app.toggle_help();
            }
            KeyAction::Continue
        }
        Mode::Normal => handle_normal(app, key),
    }
}

fn handle_normal(app: &mut App, key: KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
        KeyCode::Tab => {
            app.switch_tab();
            KeyAction::Continue
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.move_down();
            KeyAction::Continue
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.move_up();
            KeyAction::Continue
        }
        KeyCode::Char(' ') => KeyAction::Toggle,
        KeyCode::Char('d') => {
            app.request_delete();
            KeyAction::Continue
        }
        KeyCode::Char('s') => {
            app.cycle_status_filter();
            KeyAction::Refresh
        }
        KeyCode::Char('p') => {
            app.cycle_priority_filter();
            KeyAction::Refresh
        }
        KeyCode::Char('o') => {
            app.cycle_sort_field();
            KeyAction::Refresh
        }
        KeyCode::Char('r') => {
            app.reverse_order();
            KeyAction::Refresh
        }
        KeyCode::Char('/') => {
            app.start_search();
            KeyAction::Continue
        }
        KeyCode::Char('a') => {
            app.enter_add_mode();
            KeyAction::Continue
        }
        KeyCode::Char('?') => {
            app.toggle_help();
            KeyAction::Continue
        }
        _ => KeyAction::Continue,
    }
}

fn handle_search(app: &mut App, key: KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Enter => KeyAction::ApplySearch,
        KeyCode::Esc => KeyAction::ClearSearch,
        KeyCode::Backspace => {
            app.search_input.pop();
            KeyAction::Continue
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.search_input.clear();
            KeyAction::Continue
        }
        KeyCode::Char(c) => {
            app.search_input.push(c);
            KeyAction::Continue
        }
        _ => KeyAction::Continue,
    }
}

fn handle_add(app: &mut App, key: KeyEvent) -> KeyAction {
    let Some(form) = app.add_form.as_mut() else {
        return KeyAction::Continue;
    };
    match key.code {
        KeyCode::Esc => {
            app.cancel_add_mode();
            KeyAction::Continue
        }
        KeyCode::Tab => {
            form.next_field();
            KeyAction::Continue
        }
        KeyCode::BackTab => {
            form.prev_field();
            KeyAction::Continue
        }
        KeyCode::Enter => KeyAction::Submit,
        KeyCode::Backspace => {
            form.focused_buf_mut().pop();
            form.error = None;
            KeyAction::Continue
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            form.focused_buf_mut().clear();
            form.error = None;
            KeyAction::Continue
        }
        KeyCode::Char(c) => {
            form.focused_buf_mut().push(c);
            form.error = None;
            KeyAction::Continue
        }
        _ => KeyAction::Continue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::app::{AddForm, Tab};
    use taskdesk::model::{SortField, TaskSort};
    use taskdesk::shell::DashboardView;

    fn app() -> App {
        App {
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
            offline: false,
        }
    }

    fn press(app: &mut App, code: KeyCode) -> KeyAction {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn normal_keys() {
        let mut app = app();
        assert_eq!(press(&mut app, KeyCode::Tab), KeyAction::Continue);
        assert_eq!(app.tab, Tab::Tasks);
        assert_eq!(press(&mut app, KeyCode::Char('o')), KeyAction::Refresh);
        assert_eq!(app.sort.field, SortField::DueDate);
        assert_eq!(press(&mut app, KeyCode::Char(' ')), KeyAction::Toggle);
        assert_eq!(press(&mut app, KeyCode::Char('q')), KeyAction::Quit);
    }

    #[test]
    fn typing_goes_to_add_form() {
        let mut app = app();
        app.add_form = Some(AddForm::new());
        press(&mut app, KeyCode::Char('q'));
        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.add_form.as_ref().unwrap().title, "q");
        assert_eq!(press(&mut app, KeyCode::Enter), KeyAction::Submit);
        press(&mut app, KeyCode::Esc);
        assert!(app.add_form.is_none());
    }

    #[test]
    fn delete_confirmation_cancels_on_other_keys() {
        let mut app = app();
        app.mode = Mode::ConfirmDelete(4);
        assert_eq!(press(&mut app, KeyCode::Char('n')), KeyAction::Continue);
        assert_eq!(app.mode, Mode::Normal);
        app.mode = Mode::ConfirmDelete(4);
        assert_eq!(press(&mut app, KeyCode::Char('y')), KeyAction::Delete);
    }

    #[test]
    fn search_input() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.mode, Mode::Search);
        press(&mut app, KeyCode::Char('m'));
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.search_input, "md");
        assert_eq!(press(&mut app, KeyCode::Enter), KeyAction::ApplySearch);
    }
}
