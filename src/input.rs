//! Input handling
//!
//! Maps keyboard events to state transitions with context-sensitive bindings.
//! Overlays take keys first, then text fields, then the global shortcuts.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::state::{AppState, FocusedWidget};

/// Handle an input event
pub fn handle_event(event: Event, state: &mut AppState) {
    match event {
        Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
            handle_key_event(key_event, state)
        }
        _ => {}
    }
}

/// Handle a key event
pub fn handle_key_event(key: KeyEvent, state: &mut AppState) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    if state.notice.is_some() {
        return handle_notice_input(key, state);
    }
    if state.show_help {
        return handle_help_input(key, state);
    }
    if state.load_prompt.is_some() {
        return handle_load_prompt_input(key, state);
    }
    if state.settings_dialog.is_some() {
        return handle_settings_input(key, state);
    }

    // Focus movement works everywhere
    match key.code {
        KeyCode::Tab => {
            state.focus = state.focus.next();
            return;
        }
        KeyCode::BackTab => {
            state.focus = state.focus.prev();
            return;
        }
        _ => {}
    }

    if state.focus.is_text_input() {
        return handle_text_field_input(key, state);
    }

    // Global shortcuts
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => {
            state.should_quit = true;
            return;
        }
        KeyCode::Char('?') => {
            state.show_help = true;
            return;
        }
        KeyCode::Char('m') | KeyCode::Char('M') => {
            state.toggle_mode();
            return;
        }
        KeyCode::Char('o') | KeyCode::Char('O') => {
            state.open_settings();
            return;
        }
        _ => {}
    }

    match state.focus {
        FocusedWidget::ModeSelector => handle_mode_selector_input(key, state),
        FocusedWidget::Gallery => handle_gallery_input(key, state),
        FocusedWidget::Keyword | FocusedWidget::Width => {}
    }
}

fn handle_notice_input(key: KeyEvent, state: &mut AppState) {
    if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
        state.dismiss_notice();
    }
}

/// Handle input when help overlay is shown
fn handle_help_input(key: KeyEvent, state: &mut AppState) {
    if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Enter) {
        state.show_help = false;
    }
}

/// Handle input for the interactive load prompt
fn handle_load_prompt_input(key: KeyEvent, state: &mut AppState) {
    match key.code {
        KeyCode::Esc => state.cancel_load_prompt(),
        KeyCode::Enter => state.submit_load_prompt(),
        KeyCode::Backspace => {
            if let Some(prompt) = state.load_prompt.as_mut() {
                prompt.input.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(prompt) = state.load_prompt.as_mut() {
                prompt.input.push(c);
            }
        }
        _ => {}
    }
}

fn handle_settings_input(key: KeyEvent, state: &mut AppState) {
    match key.code {
        KeyCode::Esc => {
            state.cancel_settings();
            return;
        }
        KeyCode::Enter => {
            state.apply_settings();
            return;
        }
        _ => {}
    }

    let Some(dialog) = state.settings_dialog.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Up | KeyCode::BackTab => dialog.prev_field(),
        KeyCode::Down | KeyCode::Tab => dialog.next_field(),
        KeyCode::Left => dialog.adjust(false),
        KeyCode::Right => dialog.adjust(true),
        KeyCode::Backspace => dialog.pop_char(),
        KeyCode::Char(c) if dialog.editing_text() => dialog.push_char(c),
        KeyCode::Char('-') | KeyCode::Char('h') => dialog.adjust(false),
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Char('l') => dialog.adjust(true),
        _ => {}
    }
}

/// Typing into the keyword or width field
fn handle_text_field_input(key: KeyEvent, state: &mut AppState) {
    let field = match state.focus {
        FocusedWidget::Keyword => &mut state.form.keyword,
        FocusedWidget::Width => &mut state.form.width,
        _ => return,
    };
    match key.code {
        KeyCode::Enter => state.submit(),
        KeyCode::Esc => state.focus = FocusedWidget::Gallery,
        KeyCode::Backspace => {
            field.pop();
        }
        KeyCode::Char(c) => field.push(c),
        _ => {}
    }
}

fn handle_mode_selector_input(key: KeyEvent, state: &mut AppState) {
    match key.code {
        KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') => state.toggle_mode(),
        KeyCode::Enter => state.submit(),
        _ => {}
    }
}

fn handle_gallery_input(key: KeyEvent, state: &mut AppState) {
    match key.code {
        KeyCode::Left | KeyCode::Char('h') => state.select_prev(),
        KeyCode::Right | KeyCode::Char('l') => state.select_next(),
        KeyCode::Enter => state.toggle_full_view(),
        KeyCode::Esc => state.gallery.close(),
        KeyCode::Char('s') | KeyCode::Char('S') => state.save_selected(),
        KeyCode::Char('c') | KeyCode::Char('C') => state.copy_selected(),
        KeyCode::Char('x') | KeyCode::Char('X') | KeyCode::Delete => state.remove_selected(),
        _ => {}
    }
}
