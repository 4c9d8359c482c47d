//! Artwork data model
//!
//! An [`AsciiArtwork`] is a titled, non-empty sequence of equally sized
//! [`AsciiFrame`]s. Both types can only be built through their checked
//! constructors, so every value in the program satisfies those invariants.

use crate::color_space::{rgb_to_ansi_fg, Rgb, ANSI_RESET};
use crate::error::{Error, Result};

/// One character with its colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub ch: char,
    pub color: Rgb,
}

impl Cell {
    pub fn new(ch: char, color: Rgb) -> Self {
        Self { ch, color }
    }
}

/// A single grid snapshot, stored row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsciiFrame {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl AsciiFrame {
    pub fn new(width: usize, height: usize, cells: Vec<Cell>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidInput(format!(
                "frame dimensions must be positive, got {width}x{height}"
            )));
        }
        if cells.len() != width * height {
            return Err(Error::InvalidInput(format!(
                "frame {width}x{height} needs {} cells, got {}",
                width * height,
                cells.len()
            )));
        }
        if let Some(cell) = cells.iter().find(|c| c.ch.is_control()) {
            return Err(Error::InvalidInput(format!(
                "control character {:?} in frame",
                cell.ch
            )));
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(y * self.width + x)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width)
    }

    /// Character grid only, rows joined by `\n`, no trailing newline
    pub fn plain_text(&self) -> String {
        let mut out = String::with_capacity(self.height * (self.width + 1));
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.extend(row.iter().map(|c| c.ch));
        }
        out
    }

    /// TrueColor ANSI rendition, one reset per row
    pub fn ansi_text(&self) -> String {
        let mut out = String::new();
        for row in self.rows() {
            for cell in row {
                out.push_str(&rgb_to_ansi_fg(cell.color));
                out.push(cell.ch);
            }
            out.push_str(ANSI_RESET);
            out.push('\n');
        }
        out
    }
}

/// A titled sequence of frames: one for a still image, several for animation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsciiArtwork {
    title: String,
    frames: Vec<AsciiFrame>,
}

impl AsciiArtwork {
    pub fn new(title: impl Into<String>, frames: Vec<AsciiFrame>) -> Result<Self> {
        let first = frames
            .first()
            .ok_or_else(|| Error::InvalidInput("artwork needs at least one frame".into()))?;
        let (w, h) = (first.width, first.height);
        if let Some(pos) = frames
            .iter()
            .position(|f| f.width != w || f.height != h)
        {
            return Err(Error::InvalidInput(format!(
                "frame {pos} is {}x{}, expected {w}x{h}",
                frames[pos].width, frames[pos].height
            )));
        }
        // Titles are single-line labels
        let title = title
            .into()
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect();
        Ok(Self { title, frames })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn frames(&self) -> &[AsciiFrame] {
        &self.frames
    }

    /// Frame at `index`, wrapping around the sequence
    pub fn frame(&self, index: usize) -> &AsciiFrame {
        &self.frames[index % self.frames.len()]
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn width(&self) -> usize {
        self.frames[0].width
    }

    pub fn height(&self) -> usize {
        self.frames[0].height
    }

    pub fn is_animated(&self) -> bool {
        self.frames.len() > 1
    }

    pub fn plain_text(&self, frame_index: usize) -> String {
        self.frame(frame_index).plain_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: usize, height: usize, ch: char) -> AsciiFrame {
        AsciiFrame::new(
            width,
            height,
            vec![Cell::new(ch, Rgb::new(10, 20, 30)); width * height],
        )
        .unwrap()
    }

    #[test]
    fn test_frame_rejects_bad_shapes() {
        assert!(AsciiFrame::new(0, 1, vec![]).is_err());
        assert!(AsciiFrame::new(2, 2, vec![Cell::new('a', Rgb::BLACK); 3]).is_err());
        assert!(AsciiFrame::new(1, 1, vec![Cell::new('\n', Rgb::BLACK)]).is_err());
    }

    #[test]
    fn test_artwork_rejects_empty_and_mismatched() {
        assert!(AsciiArtwork::new("x", vec![]).is_err());
        let err = AsciiArtwork::new("x", vec![solid(2, 2, 'a'), solid(3, 2, 'a')]);
        assert!(matches!(err, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_plain_text_shape() {
        let frame = AsciiFrame::new(
            3,
            2,
            "abcdef"
                .chars()
                .map(|c| Cell::new(c, Rgb::new(255, 0, 0)))
                .collect(),
        )
        .unwrap();
        assert_eq!(frame.plain_text(), "abc\ndef");
        assert_eq!(frame.cell(2, 1).map(|c| c.ch), Some('f'));
        assert_eq!(frame.cell(3, 0), None);
    }

    #[test]
    fn test_title_control_chars_flattened() {
        let art = AsciiArtwork::new("two\nlines\t", vec![solid(1, 1, 'a')]).unwrap();
        assert_eq!(art.title(), "two lines ");
    }

    #[test]
    fn test_frame_index_wraps() {
        let art = AsciiArtwork::new("anim", vec![solid(1, 1, 'a'), solid(1, 1, 'b')]).unwrap();
        assert!(art.is_animated());
        assert_eq!(art.plain_text(0), "a");
        assert_eq!(art.plain_text(1), "b");
        assert_eq!(art.plain_text(2), "a");
    }

    #[test]
    fn test_ansi_text_has_colour_and_reset() {
        let text = solid(2, 1, '#').ansi_text();
        assert!(text.starts_with("\x1b[38;2;10;20;30m#"));
        assert!(text.ends_with("\x1b[0m\n"));
    }
}
