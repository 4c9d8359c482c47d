//! Help overlay rendering

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::widgets::centered_rect;

/// Render the help overlay
pub fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let overlay_width = (area.width as f32 * 0.8).min(64.0) as u16;
    let overlay_height = (area.height as f32 * 0.9).min(32.0) as u16;

    let overlay_area = centered_rect(overlay_width, overlay_height, area);

    // Clear background
    frame.render_widget(Clear, overlay_area);

    // Render help content
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            " Keyboard Shortcuts ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let help_text = create_help_text();
    let widget = Paragraph::new(help_text).style(Style::default().fg(Color::White));

    frame.render_widget(widget, inner);
}

/// Create help text content
fn create_help_text() -> Vec<Line<'static>> {
    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let mut lines = Vec::new();
    for (section, bindings) in KEY_BINDINGS {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(*section, section_style)));
        lines.extend(bindings.iter().map(|&(key, desc)| binding_line(key, desc)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "       [Press ? or Esc to close]",
        Style::default().fg(Color::DarkGray),
    )));
    lines
}

type Section = (&'static str, &'static [(&'static str, &'static str)]);

const KEY_BINDINGS: &[Section] = &[
    (
        "Global",
        &[
            ("Q / Ctrl+C", "Quit application"),
            ("?", "Toggle help overlay"),
            ("Tab", "Next widget"),
            ("Shift+Tab", "Previous widget"),
            ("M", "Toggle Generate / Load mode"),
            ("O", "Open settings"),
        ],
    ),
    (
        "Keyword & Width fields",
        &[
            ("Enter", "Generate (or open Load prompt)"),
            ("Esc", "Leave field, focus gallery"),
            ("", "Letter shortcuts type into the field"),
        ],
    ),
    (
        "Gallery",
        &[
            ("← →", "Select artwork"),
            ("Enter", "Open / close full view"),
            ("S", "Save to save folder"),
            ("C", "Copy plain text to clipboard"),
            ("X / Delete", "Remove from gallery"),
        ],
    ),
    (
        "Settings dialog",
        &[
            ("↑ ↓", "Select field"),
            ("← →", "Adjust interval (20 ms), count, charset"),
            ("Enter / Esc", "Apply / cancel"),
        ],
    ),
];

fn binding_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {key:<14}"), Style::default().fg(Color::Green)),
        Span::styled(desc, Style::default().fg(Color::White)),
    ])
}
