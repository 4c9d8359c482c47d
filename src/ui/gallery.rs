//! Gallery area rendering

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::artwork::AsciiFrame;
use crate::color_space::to_terminal_color;
use crate::gallery::{GalleryItem, Reveal};
use crate::state::{AppState, FocusedWidget};
use crate::terminal_capabilities::ColorSupport;
use crate::unicode_handler::ellipsize;

/// Render the gallery area: a grid of tiles, or one item in full view
pub fn render_gallery(frame: &mut Frame, area: Rect, state: &AppState) {
    let is_focused = state.focus == FocusedWidget::Gallery;

    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let title = if state.gallery.is_empty() {
        " Gallery ".to_string()
    } else {
        format!(" Gallery ({}) ", state.gallery.len())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(title, Style::default().add_modifier(Modifier::BOLD)));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.gallery.is_empty() {
        render_placeholder(frame, inner, state);
        return;
    }

    let support = state.capabilities.color_support;
    if state.gallery.is_full_view() {
        if let (Some(index), Some(item)) =
            (state.gallery.selected_index(), state.gallery.selected())
        {
            render_tile(frame, inner, index, item, true, support);
        }
    } else {
        render_grid(frame, inner, state, support);
    }
}

/// Lay out tiles sized to the largest artwork, scrolled so the selection is visible
fn render_grid(frame: &mut Frame, area: Rect, state: &AppState, support: ColorSupport) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let (max_w, max_h) = state.gallery.max_dimensions();
    let tile_w = (max_w as u16)
        .saturating_add(2)
        .max(12)
        .min(area.width)
        .max(1);
    let tile_h = (max_h as u16)
        .saturating_add(2)
        .max(3)
        .min(area.height)
        .max(1);

    let columns = (area.width / tile_w).max(1) as usize;
    let visible_rows = (area.height / tile_h).max(1) as usize;
    let selected = state.gallery.selected_index().unwrap_or(0);
    let first_row = (selected / columns).saturating_sub(visible_rows - 1);

    for (index, item) in state.gallery.items().iter().enumerate() {
        let row = index / columns;
        if row < first_row || row >= first_row + visible_rows {
            continue;
        }
        let tile = Rect {
            x: area.x + (index % columns) as u16 * tile_w,
            y: area.y + (row - first_row) as u16 * tile_h,
            width: tile_w,
            height: tile_h,
        };
        render_tile(frame, tile, index, item, index == selected, support);
    }
}

fn render_tile(
    frame: &mut Frame,
    area: Rect,
    index: usize,
    item: &GalleryItem,
    is_selected: bool,
    support: ColorSupport,
) {
    let border_style = if is_selected {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let label = format!("#{} {}", index + 1, item.artwork.title());
    let label = ellipsize(&label, area.width.saturating_sub(4) as usize);
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(format!(" {label} "), border_style));
    if item.artwork.is_animated() {
        block = block.title_bottom(Span::styled(
            format!(" {}/{} ", item.frame_index + 1, item.artwork.frame_count()),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = frame_lines(
        item.current_frame(),
        support,
        inner.width as usize,
        inner.height as usize,
        item.reveal.as_ref(),
    );
    frame.render_widget(Paragraph::new(lines), inner);
}

/// Coloured lines for one frame, clipped to `max_width` x `max_height`.
/// Runs of equal colour share a span. Cells a pending reveal has not reached
/// are blank.
pub fn frame_lines(
    ascii: &AsciiFrame,
    support: ColorSupport,
    max_width: usize,
    max_height: usize,
    reveal: Option<&Reveal>,
) -> Vec<Line<'static>> {
    let width = ascii.width();
    ascii
        .rows()
        .take(max_height)
        .enumerate()
        .map(|(y, row)| {
            let mut spans: Vec<Span<'static>> = Vec::new();
            let mut run = String::new();
            let mut run_color = None;

            for (x, cell) in row.iter().take(max_width).enumerate() {
                let shown = reveal.map_or(true, |r| r.is_shown(y * width + x));
                let (ch, color) = if shown {
                    (cell.ch, to_terminal_color(cell.color, support))
                } else {
                    (' ', None)
                };
                if color != run_color && !run.is_empty() {
                    spans.push(styled_run(std::mem::take(&mut run), run_color));
                }
                run_color = color;
                run.push(ch);
            }
            if !run.is_empty() {
                spans.push(styled_run(run, run_color));
            }
            Line::from(spans)
        })
        .collect()
}

fn styled_run(text: String, color: Option<Color>) -> Span<'static> {
    match color {
        Some(color) => Span::styled(text, Style::default().fg(color)),
        None => Span::raw(text),
    }
}

/// Render placeholder when no content
fn render_placeholder(frame: &mut Frame, area: Rect, state: &AppState) {
    let message = if state.is_busy() {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                state.status_message.clone(),
                Style::default().fg(Color::Yellow),
            )),
        ]
    } else {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                "Gallery is empty",
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Type a keyword and press [Enter] to generate",
                Style::default().fg(Color::Green),
            )),
            Line::from(Span::styled(
                "Press [M] for Load mode to open saved .cwi files",
                Style::default().fg(Color::DarkGray),
            )),
        ]
    };

    let widget = Paragraph::new(message)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);

    frame.render_widget(widget, area);
}
