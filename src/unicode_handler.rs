//! Unicode width utilities
//!
//! Tile titles and text fields are measured in terminal columns, not bytes
//! or chars, so wide glyphs and grapheme clusters don't break the layout.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

const ELLIPSIS: &str = "…";

/// Calculate the display width of a string
///
/// Takes into account East Asian Wide/Fullwidth characters.
pub fn display_width(s: &str) -> usize {
    s.width()
}

/// Truncate a string to fit within a maximum display width
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for grapheme in s.graphemes(true) {
        let grapheme_width = grapheme.width();
        if current_width + grapheme_width > max_width {
            break;
        }
        result.push_str(grapheme);
        current_width += grapheme_width;
    }

    result
}

/// Like [`truncate_to_width`], but marks the cut with an ellipsis
pub fn ellipsize(s: &str, max_width: usize) -> String {
    if display_width(s) <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut out = truncate_to_width(s, max_width - 1);
    out.push_str(ELLIPSIS);
    out
}

/// Keep the end of a string, for text fields where the cursor sits at the end
pub fn tail_to_width(s: &str, max_width: usize) -> String {
    if display_width(s) <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let budget = max_width - 1;
    let mut kept = Vec::new();
    let mut current_width = 0;
    for grapheme in s.graphemes(true).rev() {
        let grapheme_width = grapheme.width();
        if current_width + grapheme_width > budget {
            break;
        }
        kept.push(grapheme);
        current_width += grapheme_width;
    }

    let mut out = String::from(ELLIPSIS);
    out.extend(kept.into_iter().rev());
    out
}
