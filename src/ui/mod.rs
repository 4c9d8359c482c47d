//! UI module
//!
//! Contains all UI rendering components using Ratatui.

mod gallery;
mod help;
mod widgets;

pub use gallery::frame_lines;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::state::{AppState, FocusedWidget};
use crate::unicode_handler::{display_width, ellipsize};

/// Main render function - draws the entire UI
pub fn render(frame: &mut Frame, state: &AppState) {
    let size = frame.area();

    // Check minimum size
    if size.width < 40 || size.height < 15 {
        render_size_warning(frame, size);
        return;
    }

    // Main layout: title bar, content, status bar
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(size);

    render_title_bar(frame, main_chunks[0], state);
    render_main_content(frame, main_chunks[1], state);
    render_status_bar(frame, main_chunks[2], state);

    // Overlays, most urgent last so it draws on top
    if let Some(dialog) = &state.settings_dialog {
        widgets::render_settings_dialog(frame, size, dialog);
    }
    if let Some(prompt) = &state.load_prompt {
        widgets::render_load_prompt(frame, size, &prompt.input);
    }
    if state.show_help {
        help::render_help_overlay(frame, size);
    }
    if let Some(notice) = &state.notice {
        widgets::render_notice(frame, size, notice);
    }
}

/// Render warning when terminal is too small
fn render_size_warning(frame: &mut Frame, area: Rect) {
    let warning = Paragraph::new("Terminal too small!\nMinimum: 40x15")
        .style(Style::default().fg(Color::Red))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(warning, area);
}

/// Render the title bar
fn render_title_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let mode = state.form.mode.name();
    let colors = state.capabilities.color_support.name();
    let used = " chromaglyph ".len() + mode.len() + colors.len() + 30;

    let title = Line::from(vec![
        Span::styled(
            " chromaglyph ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("│ "),
        Span::styled(mode, Style::default().fg(Color::Yellow)),
        Span::raw(" │ "),
        Span::styled(colors, Style::default().fg(Color::Gray)),
        Span::raw(" ".repeat((area.width as usize).saturating_sub(used))),
        Span::styled("[?]", Style::default().fg(Color::Green)),
        Span::raw(" Help  "),
        Span::styled("[Q]", Style::default().fg(Color::Red)),
        Span::raw(" Quit "),
    ]);

    let title_widget = Paragraph::new(title)
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(title_widget, area);
}

/// Render the main content area
fn render_main_content(frame: &mut Frame, area: Rect, state: &AppState) {
    // Responsive layout: side-by-side if wide enough, stacked if narrow
    let chunks = if area.width >= 80 {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(32), // Form panel
                Constraint::Min(40),    // Gallery
            ])
            .split(area)
    } else {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(11), // Form panel
                Constraint::Min(5),     // Gallery
            ])
            .split(area)
    };

    render_form_panel(frame, chunks[0], state);
    gallery::render_gallery(frame, chunks[1], state);
}

fn render_form_panel(frame: &mut Frame, area: Rect, state: &AppState) {
    let is_focused = matches!(
        state.focus,
        FocusedWidget::ModeSelector | FocusedWidget::Keyword | FocusedWidget::Width
    );

    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(
            format!(" {} ", state.form.mode.name()),
            Style::default().add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    widgets::render_form(frame, inner, state);
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let status_color = if state.notice.is_some() {
        Color::Red
    } else if state.is_busy() {
        Color::Yellow
    } else {
        Color::White
    };

    let info = match (state.gallery.selected_index(), state.gallery.selected()) {
        (Some(index), Some(item)) => format!(
            "{}/{} │ {}x{} │ {} ms",
            index + 1,
            state.gallery.len(),
            item.artwork.width(),
            item.artwork.height(),
            state.settings.frame_interval_ms
        ),
        _ => format!("{} ms", state.settings.frame_interval_ms),
    };

    let status_room = (area.width as usize).saturating_sub(display_width(&info) + 3);
    let status = ellipsize(&state.status_message, status_room);
    let spacing = status_room.saturating_sub(display_width(&status));

    let line = Line::from(vec![
        Span::raw(" "),
        Span::styled(status, Style::default().fg(status_color)),
        Span::raw(" ".repeat(spacing)),
        Span::styled(info, Style::default().fg(Color::DarkGray)),
        Span::raw(" "),
    ]);

    let widget = Paragraph::new(line).style(Style::default().bg(Color::Black).fg(Color::White));

    frame.render_widget(widget, area);
}
