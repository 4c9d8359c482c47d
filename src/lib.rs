//! chromaglyph - keyword to animated, colourised ASCII art in the terminal
//!
//! A TUI application that searches images for a keyword, converts them into
//! coloured character grids, and lets you animate, save, load and copy them.

pub mod artwork;
pub mod color_space;
pub mod config;
pub mod converter;
pub mod error;
pub mod gallery;
pub mod image_loader;
pub mod input;
pub mod logging;
pub mod source;
pub mod state;
pub mod storage;
pub mod terminal_capabilities;
pub mod ui;
pub mod unicode_handler;
pub mod worker;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use artwork::{AsciiArtwork, AsciiFrame, Cell};
pub use config::{Settings, SettingsStore};
pub use error::{Error, Result};
pub use state::AppState;
