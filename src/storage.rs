//! Artwork files
//!
//! A `.cwi` file is UTF-8 text: a TOML header, a `---` line, then
//! `frames * height` rows. Each row holds `width` cells written as six hex
//! digits (`RRGGBB`) followed by the cell character.
//!
//! ```text
//! # chromaglyph artwork
//! version = 1
//! title = "sunflower"
//! width = 2
//! height = 1
//! frames = 1
//! ---
//! FF0000@00FF00#
//! ```

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::artwork::{AsciiArtwork, AsciiFrame, Cell};
use crate::color_space::Rgb;
use crate::config::ensure_writable_dir;
use crate::error::{Error, Result};

pub const ARTWORK_EXTENSION: &str = "cwi";
const FORMAT_VERSION: u32 = 1;
const HEADER_END: &str = "---";
const MAGIC_COMMENT: &str = "# chromaglyph artwork";
/// Largest width or height a file may declare
pub const MAX_DIMENSION: usize = u16::MAX as usize;

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Header {
    version: u32,
    title: String,
    width: usize,
    height: usize,
    frames: usize,
}

/// Serialize an artwork into the `.cwi` text form
pub fn encode(artwork: &AsciiArtwork) -> String {
    let header = Header {
        version: FORMAT_VERSION,
        title: artwork.title().to_string(),
        width: artwork.width(),
        height: artwork.height(),
        frames: artwork.frame_count(),
    };
    // A struct of plain scalars always serializes
    let header_toml = toml::to_string(&header).unwrap_or_default();

    let cells = artwork.frame_count() * artwork.width() * artwork.height();
    let mut out = String::with_capacity(header_toml.len() + cells * 8 + 64);
    out.push_str(MAGIC_COMMENT);
    out.push('\n');
    out.push_str(&header_toml);
    if !header_toml.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(HEADER_END);
    out.push('\n');

    for frame in artwork.frames() {
        for row in frame.rows() {
            for cell in row {
                out.push_str(&cell.color.to_hex());
                out.push(cell.ch);
            }
            out.push('\n');
        }
    }
    out
}

/// Parse the `.cwi` text form. `path` is only used in error messages.
pub fn decode(text: &str, path: &Path) -> Result<AsciiArtwork> {
    let corrupt = |reason: String| Error::corrupt(path, reason);

    let mut lines = text.split('\n');
    let mut header_toml = String::new();
    let mut found_end = false;
    for line in lines.by_ref() {
        if line.trim_end_matches('\r') == HEADER_END {
            found_end = true;
            break;
        }
        header_toml.push_str(line);
        header_toml.push('\n');
    }
    if !found_end {
        return Err(corrupt("missing header terminator".into()));
    }

    let header: Header =
        toml::from_str(&header_toml).map_err(|e| corrupt(format!("bad header: {}", e.message())))?;
    if header.version != FORMAT_VERSION {
        return Err(corrupt(format!("unsupported version {}", header.version)));
    }
    if header.width == 0 || header.height == 0 || header.frames == 0 {
        return Err(corrupt("empty dimensions".into()));
    }
    if header.width > MAX_DIMENSION || header.height > MAX_DIMENSION {
        return Err(corrupt(format!(
            "dimensions {}x{} exceed {MAX_DIMENSION}",
            header.width, header.height
        )));
    }

    let mut rows: Vec<&str> = lines.map(|line| line.trim_end_matches('\r')).collect();
    // Only line breaks may follow the last row
    while rows.last().is_some_and(|row| row.is_empty()) {
        rows.pop();
    }
    if header.frames.checked_mul(header.height) != Some(rows.len()) {
        return Err(corrupt(format!(
            "expected {} frames of {} rows, found {} rows",
            header.frames,
            header.height,
            rows.len()
        )));
    }

    // Each cell takes at least seven bytes of text
    let frame_cells = header.width.saturating_mul(header.height).min(text.len() / 7 + 1);
    let mut frames = Vec::with_capacity(header.frames);
    for (frame_idx, frame_rows) in rows.chunks(header.height).enumerate() {
        let mut cells = Vec::with_capacity(frame_cells);
        for (row_idx, line) in frame_rows.iter().enumerate() {
            parse_row(line, header.width, &mut cells).map_err(|reason| {
                corrupt(format!("frame {frame_idx} row {row_idx}: {reason}"))
            })?;
        }
        let frame = AsciiFrame::new(header.width, header.height, cells)
            .map_err(|e| corrupt(e.to_string()))?;
        frames.push(frame);
    }

    AsciiArtwork::new(header.title, frames).map_err(|e| corrupt(e.to_string()))
}

fn parse_row(line: &str, width: usize, cells: &mut Vec<Cell>) -> std::result::Result<(), String> {
    let mut chars = line.chars();
    for col in 0..width {
        let hex: String = chars.by_ref().take(6).collect();
        let color = Rgb::from_hex(&hex).ok_or_else(|| format!("bad colour at column {col}"))?;
        let ch = chars
            .next()
            .ok_or_else(|| format!("row ends at column {col}"))?;
        if ch.is_control() {
            return Err(format!("control character at column {col}"));
        }
        cells.push(Cell::new(ch, color));
    }
    if chars.next().is_some() {
        return Err(format!("row longer than {width} cells"));
    }
    Ok(())
}

/// Write an artwork to `path`
pub fn save(artwork: &AsciiArtwork, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(encode(artwork).as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Read an artwork from `path`
pub fn load(path: &Path) -> Result<AsciiArtwork> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8(bytes).map_err(|_| Error::corrupt(path, "not UTF-8 text"))?;
    decode(&text, path)
}

/// Artworks from every `.cwi` file in `dir`, sorted by file name.
///
/// Unreadable files don't stop the scan; their errors are returned alongside.
pub fn load_dir(dir: &Path) -> Result<(Vec<AsciiArtwork>, Vec<Error>)> {
    if !dir.is_dir() {
        return Err(Error::invalid_path(dir, "not a directory"));
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && has_artwork_extension(p))
        .collect();
    paths.sort();

    let mut artworks = Vec::new();
    let mut errors = Vec::new();
    for path in paths {
        match load(&path) {
            Ok(artwork) => artworks.push(artwork),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping artwork file");
                errors.push(e);
            }
        }
    }
    debug!(dir = %dir.display(), loaded = artworks.len(), failed = errors.len(), "scanned folder");
    Ok((artworks, errors))
}

pub fn has_artwork_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(ARTWORK_EXTENSION))
        .unwrap_or(false)
}

/// Saves artworks into one folder with unique, timestamped names
#[derive(Debug, Clone)]
pub struct ArtworkStorage {
    folder: PathBuf,
}

impl ArtworkStorage {
    pub fn new(folder: impl Into<PathBuf>) -> Result<Self> {
        let folder = folder.into();
        ensure_writable_dir(&folder)?;
        Ok(Self { folder })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Save under `{unix_secs}_{slug}.cwi`, never overwriting
    pub fn save_artwork(&self, artwork: &AsciiArtwork) -> Result<PathBuf> {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let path = self.unique_path(&format!("{secs}_{}", slug(artwork.title())));
        save(artwork, &path)?;
        info!(path = %path.display(), "artwork saved");
        Ok(path)
    }

    fn unique_path(&self, stem: &str) -> PathBuf {
        let mut candidate = self.folder.join(format!("{stem}.{ARTWORK_EXTENSION}"));
        let mut n = 1;
        while candidate.exists() {
            candidate = self.folder.join(format!("{stem}_{n}.{ARTWORK_EXTENSION}"));
            n += 1;
        }
        candidate
    }
}

/// File-name-safe version of a title
fn slug(title: &str) -> String {
    let mut out = String::new();
    for c in title.trim().chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
        if out.chars().count() >= 40 {
            break;
        }
    }
    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        "artwork".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artwork(title: &str) -> AsciiArtwork {
        let frame = |offset: u8| {
            AsciiFrame::new(
                2,
                2,
                vec![
                    Cell::new('@', Rgb::new(255, offset, 0)),
                    Cell::new('░', Rgb::new(0, 255, offset)),
                    Cell::new(' ', Rgb::new(offset, 0, 255)),
                    Cell::new('#', Rgb::new(1, 2, 3)),
                ],
            )
            .unwrap()
        };
        AsciiArtwork::new(title, vec![frame(0), frame(9)]).unwrap()
    }

    #[test]
    fn test_encode_layout() {
        let text = encode(&artwork("sun"));
        assert!(text.starts_with("# chromaglyph artwork\n"));
        assert!(text.contains("title = \"sun\""));
        assert!(text.contains("\n---\nFF0000@00FF00░\n"));
        assert_eq!(text.split("---\n").nth(1).unwrap().lines().count(), 4);
    }

    #[test]
    fn test_save_load_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.cwi");
        let original = artwork("quote \" and \\ and # hash");

        save(&original, &path).unwrap();
        assert_eq!(load(&path).unwrap(), original);
    }

    #[test]
    fn test_crlf_is_accepted() {
        let text = encode(&artwork("win")).replace('\n', "\r\n");
        assert_eq!(decode(&text, Path::new("w.cwi")).unwrap(), artwork("win"));
    }

    #[test]
    fn test_corrupt_inputs() {
        let p = Path::new("x.cwi");
        let good = encode(&artwork("t"));

        let cases = [
            String::new(),
            "hello world\n".to_string(),
            good.replace("version = 1", "version = 2"),
            good.replace("frames = 2", "frames = 3"),
            good.replace("FF0000@", "FF0000"),
            good.replace("FF0000@", "GG0000@"),
            format!("{good}extra\n"),
            good.replace("width = 2", "width = 0"),
            good.replace("title = \"t\"", "title = \"t\"\nsurprise = 1"),
        ];
        for (i, text) in cases.iter().enumerate() {
            let result = decode(text, p);
            assert!(
                matches!(result, Err(Error::CorruptFile { .. })),
                "case {i} should be corrupt"
            );
        }
    }

    #[test]
    fn test_oversized_headers_are_corrupt() {
        let p = Path::new("huge.cwi");
        let header = |w: &str, h: &str, f: &str| {
            format!("# chromaglyph artwork\nversion = 1\ntitle = \"x\"\nwidth = {w}\nheight = {h}\nframes = {f}\n---\n")
        };

        let cases = [
            header("1", "1", "9223372036854775807"),
            header("8589934592", "8589934592", "1"),
            header("65536", "1", "1"),
            format!("{}000000@\n", header("1", "2", "9223372036854775807")),
            format!("{}000000@\n", header("65535", "65535", "1")),
        ];
        for (i, text) in cases.iter().enumerate() {
            assert!(
                matches!(decode(text, p), Err(Error::CorruptFile { .. })),
                "case {i} should be corrupt"
            );
        }
    }

    #[test]
    fn test_load_non_utf8_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bin.cwi");
        fs::write(&path, [0xFF, 0xFE, 0x00, 0x01]).unwrap();
        assert!(matches!(load(&path), Err(Error::CorruptFile { .. })));
    }

    #[test]
    fn test_storage_unique_names() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ArtworkStorage::new(dir.path()).unwrap();
        let art = artwork("Sun Flower!");

        let first = storage.save_artwork(&art).unwrap();
        let second = storage.save_artwork(&art).unwrap();

        assert_ne!(first, second);
        let name = first.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.ends_with("_sun-flower.cwi"), "{name}");
        assert_eq!(load(&second).unwrap(), art);
    }

    #[test]
    fn test_storage_rejects_missing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let err = ArtworkStorage::new(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, Error::InvalidPath { .. }));
    }

    #[test]
    fn test_load_dir_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        save(&artwork("b"), &dir.path().join("2_b.cwi")).unwrap();
        save(&artwork("a"), &dir.path().join("1_a.cwi")).unwrap();
        fs::write(dir.path().join("3_bad.cwi"), "nope").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let (artworks, errors) = load_dir(dir.path()).unwrap();
        let titles: Vec<&str> = artworks.iter().map(|a| a.title()).collect();
        assert_eq!(titles, vec!["a", "b"]);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("Sun Flower!"), "sun-flower");
        assert_eq!(slug("  ***  "), "artwork");
        assert_eq!(slug("café au lait"), "café-au-lait");
    }
}
