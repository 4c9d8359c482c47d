//! Log file setup
//!
//! The TUI owns stdout, so tracing output goes to `chromaglyph.log` in the
//! platform data directory. The filter is read from `CHROMAGLYPH_LOG`, then
//! `RUST_LOG`, defaulting to `info`.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::Result;

pub const LOG_FILE_NAME: &str = "chromaglyph.log";
pub const LOG_ENV_VAR: &str = "CHROMAGLYPH_LOG";

/// Where the log file lives unless overridden
pub fn default_log_dir() -> PathBuf {
    ProjectDirs::from("com", "chromaglyph", "chromaglyph")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(std::env::temp_dir)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber, appending to `dir/chromaglyph.log`.
/// Returns the log file path.
pub fn init(dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(env_filter())
        .try_init()
        .map_err(|e| io::Error::other(e.to_string()))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_to_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = init(&dir.path().join("logs")).unwrap();
        tracing::info!("hello from the test");

        assert_eq!(path.file_name().unwrap(), LOG_FILE_NAME);
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("hello from the test"));

        // A second subscriber is refused, not a panic
        assert!(init(dir.path()).is_err());
    }
}
