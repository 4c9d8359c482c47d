//! Shared fixtures for unit tests

use std::cell::RefCell;
use std::io::Cursor;
use std::rc::Rc;
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use tempfile::TempDir;

use crate::artwork::{AsciiArtwork, AsciiFrame, Cell};
use crate::color_space::Rgb;
use crate::config::{Settings, SettingsStore};
use crate::error::{Error, Result};
use crate::gallery::ClipboardSink;
use crate::source::{ImageRef, ImageSource};
use crate::state::AppState;
use crate::terminal_capabilities::TerminalCapabilities;
use crate::worker::spawn_worker;

pub fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(w, h, |x, _| Rgba([(x * 30) as u8, 90, 160, 255]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

/// Offline source serving fixed image bytes
pub struct StaticSource {
    images: Vec<Vec<u8>>,
}

impl StaticSource {
    pub fn new(images: Vec<Vec<u8>>) -> Self {
        Self { images }
    }
}

impl ImageSource for StaticSource {
    fn search(&self, keyword: &str, count: usize) -> Result<Vec<ImageRef>> {
        if self.images.is_empty() {
            return Err(Error::NoResults(keyword.to_string()));
        }
        Ok((0..self.images.len().min(count))
            .map(|i| ImageRef {
                url: i.to_string(),
            })
            .collect())
    }

    fn fetch(&self, image: &ImageRef) -> Result<Vec<u8>> {
        image
            .url
            .parse::<usize>()
            .ok()
            .and_then(|i| self.images.get(i).cloned())
            .ok_or_else(|| Error::Network(format!("unknown image {}", image.url)))
    }
}

/// App state whose folders and settings file live in a fresh temp dir
pub fn test_state(source: StaticSource) -> (AppState, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings {
        save_folder: dir.path().to_path_buf(),
        load_folder: dir.path().to_path_buf(),
        ..Settings::default()
    };
    let store = SettingsStore::at(dir.path().join("config.toml"));
    let worker = spawn_worker(Arc::new(source)).unwrap();
    let state = AppState::new(settings, store, TerminalCapabilities::default(), worker);
    (state, dir)
}

/// 2x2 still artwork reading "@.\n.@"
pub fn sample_artwork(title: &str) -> AsciiArtwork {
    let cells = "@..@"
        .chars()
        .map(|c| Cell::new(c, Rgb::new(240, 200, 10)))
        .collect();
    AsciiArtwork::new(title, vec![AsciiFrame::new(2, 2, cells).unwrap()]).unwrap()
}

/// Clipboard whose contents stay readable after being boxed into state
#[derive(Clone, Default)]
pub struct SharedClipboard(Rc<RefCell<Vec<String>>>);

impl SharedClipboard {
    pub fn contents(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}

impl ClipboardSink for SharedClipboard {
    fn set_text(&mut self, text: String) -> Result<()> {
        self.0.borrow_mut().push(text);
        Ok(())
    }
}
