//! Error taxonomy
//!
//! Every failure the application can show to the user. None of them is fatal:
//! callers turn them into a dismissible notice.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// No or failed connection to the image source
    #[error("Network error: {0}")]
    Network(String),

    /// The keyword (or folder) produced nothing usable
    #[error("No results for '{0}'")]
    NoResults(String),

    /// A configured folder does not exist or cannot be written
    #[error("Invalid path {}: {reason}", path.display())]
    InvalidPath { path: PathBuf, reason: String },

    /// A file handed to load mode is not a saved artwork
    #[error("Corrupt artwork file {}: {reason}", path.display())]
    CorruptFile { path: PathBuf, reason: String },

    /// Rejected user input (width, keyword, interval)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Downloaded bytes are not a decodable image
    #[error("Could not decode image: {0}")]
    Decode(String),

    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn invalid_path(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::CorruptFile {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Short label used as the notice title
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Network(_) => "Network error",
            Error::NoResults(_) => "No results",
            Error::InvalidPath { .. } => "Invalid folder",
            Error::CorruptFile { .. } => "Corrupt file",
            Error::InvalidInput(_) => "Invalid input",
            Error::Decode(_) => "Decode error",
            Error::Clipboard(_) => "Clipboard error",
            Error::Io(_) => "IO error",
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Decode(err.to_string())
    }
}

impl From<arboard::Error> for Error {
    fn from(err: arboard::Error) -> Self {
        Error::Clipboard(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_path() {
        let err = Error::corrupt("/tmp/a.cwi", "bad header");
        let msg = err.to_string();
        assert!(msg.contains("/tmp/a.cwi"));
        assert!(msg.contains("bad header"));
        assert_eq!(err.kind(), "Corrupt file");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
