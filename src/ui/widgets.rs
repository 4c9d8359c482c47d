//! Form panel and dialog widgets

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::state::{AppState, FocusedWidget, Mode, Notice, SettingsDialog};
use crate::unicode_handler::{ellipsize, tail_to_width};

/// Render the keyword/width form and the available actions
pub fn render_form(frame: &mut Frame, area: Rect, state: &AppState) {
    let value_width = area.width.saturating_sub(12) as usize;
    let mut lines = Vec::new();

    let mode_focused = state.focus == FocusedWidget::ModeSelector;
    lines.push(Line::from(vec![
        Span::styled(
            if mode_focused { "▸ " } else { "  " },
            Style::default().fg(Color::Cyan),
        ),
        mode_span(Mode::Generate, state.form.mode),
        Span::raw(" "),
        mode_span(Mode::Load, state.form.mode),
    ]));
    lines.push(Line::from(""));

    if state.form.mode == Mode::Generate {
        lines.push(create_input_line(
            "Keyword",
            &state.form.keyword,
            state.focus == FocusedWidget::Keyword,
            value_width,
        ));
        lines.push(create_input_line(
            "Width",
            &state.form.width,
            state.focus == FocusedWidget::Width,
            value_width,
        ));
        lines.push(create_setting_line(
            "Images",
            &state.settings.image_count.to_string(),
            false,
            None,
        ));
        lines.push(create_setting_line(
            "Charset",
            state.settings.charset.name(),
            false,
            None,
        ));
        lines.push(Line::from(""));
        lines.push(create_action_line("[Enter]", "Generate"));
    } else {
        lines.push(create_setting_line(
            "Folder",
            &tail_to_width(&state.settings.load_folder.display().to_string(), value_width),
            false,
            None,
        ));
        lines.push(Line::from(""));
        lines.push(create_action_line("[Enter]", "Load .cwi files"));
    }

    lines.push(create_action_line("[M]", "Switch mode"));
    lines.push(create_action_line("[O]", "Settings"));

    if state.focus == FocusedWidget::Gallery {
        lines.push(Line::from(""));
        lines.push(create_action_line("[S]", "Save selected"));
        lines.push(create_action_line("[C]", "Copy selected"));
        lines.push(create_action_line("[X]", "Remove selected"));
    }

    let widget = Paragraph::new(lines);
    frame.render_widget(widget, area);
}

fn mode_span(mode: Mode, current: Mode) -> Span<'static> {
    if mode == current {
        Span::styled(
            format!("● {}", mode.name()),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(
            format!("○ {}", mode.name()),
            Style::default().fg(Color::DarkGray),
        )
    }
}

/// Render the settings dialog overlay
pub fn render_settings_dialog(frame: &mut Frame, area: Rect, dialog: &SettingsDialog) {
    let overlay = centered_rect(area.width.min(64), 14u16.min(area.height), area);
    frame.render_widget(Clear, overlay);

    let block = overlay_block(" Settings ", Color::Cyan);
    let inner = block.inner(overlay);
    frame.render_widget(block, overlay);

    let value_width = inner.width.saturating_sub(24) as usize;
    let mut lines = Vec::new();
    for index in 0..SettingsDialog::FIELD_COUNT {
        let is_selected = dialog.selected_field == index;
        let hint = match index {
            0 | 1 | 3 => None,
            _ => Some("[←/→]"),
        };
        let mut value = dialog.field_value(index);
        if is_selected && dialog.editing_text() {
            value.push('▌');
        }
        lines.push(create_setting_line(
            SettingsDialog::field_name(index),
            &tail_to_width(&value, value_width),
            is_selected,
            hint,
        ));
    }
    lines.push(Line::from(""));
    lines.push(create_action_line("[↑/↓]", "Select field"));
    lines.push(create_action_line("[Enter]", "Apply"));
    lines.push(create_action_line("[Esc]", "Cancel"));

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render the load path prompt
pub fn render_load_prompt(frame: &mut Frame, area: Rect, input: &str) {
    let overlay = centered_rect(area.width.min(70), 6u16.min(area.height), area);
    frame.render_widget(Clear, overlay);

    let block = overlay_block(" Load artwork ", Color::Cyan);
    let inner = block.inner(overlay);
    frame.render_widget(block, overlay);

    let shown = tail_to_width(input, inner.width.saturating_sub(2) as usize);
    let lines = vec![
        Line::from(Span::styled(
            "A .cwi file, or a folder to load every .cwi in it:",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            format!("{shown}▌"),
            Style::default().fg(Color::Green),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "[Enter] Load  [Esc] Cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render a dismissible error notice
pub fn render_notice(frame: &mut Frame, area: Rect, notice: &Notice) {
    let overlay = centered_rect(area.width.min(60), 8u16.min(area.height), area);
    frame.render_widget(Clear, overlay);

    let title = format!(" {} ", ellipsize(&notice.title, overlay.width.saturating_sub(4) as usize));
    let block = overlay_block(&title, Color::Red);
    let inner = block.inner(overlay);
    frame.render_widget(block, overlay);

    let lines = vec![
        Line::from(notice.message.clone()),
        Line::from(""),
        Line::from(Span::styled(
            "[Enter/Esc] Dismiss",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let widget = Paragraph::new(lines)
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, inner);
}

fn overlay_block(title: &str, color: Color) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(Span::styled(
            title.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center)
}

/// Text field line with a cursor when focused
fn create_input_line(label: &str, value: &str, is_focused: bool, max_width: usize) -> Line<'static> {
    let shown = if is_focused {
        format!("{}▌", tail_to_width(value, max_width.saturating_sub(1)))
    } else if value.is_empty() {
        "[Type here...]".to_string()
    } else {
        ellipsize(value, max_width)
    };

    let (label_style, value_style) = if is_focused {
        (
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            Style::default().fg(Color::Green),
        )
    } else {
        (
            Style::default().fg(Color::White),
            Style::default().fg(Color::DarkGray),
        )
    };

    Line::from(vec![
        Span::styled(
            if is_focused { "▸ " } else { "  " },
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(format!("{label}: "), label_style),
        Span::styled(shown, value_style),
    ])
}

/// Create a setting line with label, value, and optional hint
fn create_setting_line(
    label: &str,
    value: &str,
    is_selected: bool,
    hint: Option<&str>,
) -> Line<'static> {
    let indicator = if is_selected { "▸" } else { " " };
    let indicator_style = Style::default().fg(Color::Cyan);

    let label_style = if is_selected {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    let value_style = if is_selected {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let mut spans = vec![
        Span::styled(format!("{} ", indicator), indicator_style),
        Span::styled(format!("{}: ", label), label_style),
        Span::styled(value.to_string(), value_style),
    ];

    if let Some(hint_text) = hint {
        spans.push(Span::styled(
            format!(" {}", hint_text),
            Style::default().fg(Color::DarkGray),
        ));
    }

    Line::from(spans)
}

/// Create an action line (button-like)
fn create_action_line(key: &str, label: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled("  ", Style::default()),
        Span::styled(key.to_string(), Style::default().fg(Color::Green)),
        Span::styled(format!(" {}", label), Style::default().fg(Color::White)),
    ])
}

/// Create a centered rectangle
pub(crate) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal_padding = area.width.saturating_sub(width) / 2;
    let vertical_padding = area.height.saturating_sub(height) / 2;

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(vertical_padding),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(horizontal_padding),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vertical[1])[1]
}
