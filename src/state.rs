//! Application state management
//!
//! Single source of truth for everything the UI shows: settings, gallery,
//! form input, overlays and the outstanding worker request.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::artwork::AsciiArtwork;
use crate::config::{
    Settings, SettingsStore, SettingsUpdate, MAX_FRAME_INTERVAL_MS, MAX_IMAGE_COUNT,
    MAX_REVEAL_DELAY_MS, MIN_FRAME_INTERVAL_MS,
};
use crate::converter::{validate_width, CharacterSet};
use crate::error::{Error, Result};
use crate::gallery::{self, AnimationClock, ClipboardSink, Gallery, SystemClipboard};
use crate::storage::{self, ArtworkStorage};
use crate::terminal_capabilities::TerminalCapabilities;
use crate::worker::{WorkerHandle, WorkerResponse};

/// Slider step for the frame interval
pub const INTERVAL_STEP_MS: u64 = 20;

/// What Enter on the form does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Generate,
    Load,
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Generate => "Generate",
            Mode::Load => "Load",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            Mode::Generate => Mode::Load,
            Mode::Load => Mode::Generate,
        }
    }
}

/// Which widget is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusedWidget {
    ModeSelector,
    #[default]
    Keyword,
    Width,
    Gallery,
}

impl FocusedWidget {
    pub fn next(&self) -> Self {
        match self {
            FocusedWidget::ModeSelector => FocusedWidget::Keyword,
            FocusedWidget::Keyword => FocusedWidget::Width,
            FocusedWidget::Width => FocusedWidget::Gallery,
            FocusedWidget::Gallery => FocusedWidget::ModeSelector,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            FocusedWidget::ModeSelector => FocusedWidget::Gallery,
            FocusedWidget::Keyword => FocusedWidget::ModeSelector,
            FocusedWidget::Width => FocusedWidget::Keyword,
            FocusedWidget::Gallery => FocusedWidget::Width,
        }
    }

    pub fn is_text_input(&self) -> bool {
        matches!(self, FocusedWidget::Keyword | FocusedWidget::Width)
    }
}

/// Main menu inputs
#[derive(Debug, Clone, Default)]
pub struct GenerateForm {
    pub mode: Mode,
    pub keyword: String,
    pub width: String,
}

impl GenerateForm {
    /// Trimmed keyword and parsed width, or the reason they are unusable
    pub fn validate(&self) -> Result<(String, usize)> {
        let keyword = self.keyword.trim();
        if keyword.is_empty() {
            return Err(Error::InvalidInput("enter a keyword to search for".into()));
        }
        let width = self.width.trim().parse::<usize>().map_err(|_| {
            Error::InvalidInput(format!("width '{}' is not a whole number", self.width.trim()))
        })?;
        Ok((keyword.to_string(), validate_width(width)?))
    }
}

/// A dismissible message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

impl From<&Error> for Notice {
    fn from(error: &Error) -> Self {
        Self {
            title: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}

/// Path entry for Load mode
#[derive(Debug, Clone, Default)]
pub struct LoadPrompt {
    pub input: String,
}

/// Editable copy of the settings shown in the settings dialog
#[derive(Debug, Clone)]
pub struct SettingsDialog {
    pub save_folder: String,
    pub load_folder: String,
    pub frame_interval_ms: u64,
    pub default_width: String,
    pub image_count: usize,
    pub charset: CharacterSet,
    pub reveal_delay_ms: u64,
    pub selected_field: usize,
}

impl SettingsDialog {
    pub const FIELD_COUNT: usize = 7;

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            save_folder: settings.save_folder.display().to_string(),
            load_folder: settings.load_folder.display().to_string(),
            frame_interval_ms: settings.frame_interval_ms,
            default_width: settings.default_width.to_string(),
            image_count: settings.image_count,
            charset: settings.charset.clone(),
            reveal_delay_ms: settings.reveal_delay_ms,
            selected_field: 0,
        }
    }

    pub fn field_name(index: usize) -> &'static str {
        match index {
            0 => "Save folder",
            1 => "Load folder",
            2 => "Frame interval",
            3 => "Default width",
            4 => "Images per search",
            5 => "Charset",
            6 => "Reveal delay",
            _ => "Unknown",
        }
    }

    pub fn field_value(&self, index: usize) -> String {
        match index {
            0 => self.save_folder.clone(),
            1 => self.load_folder.clone(),
            2 => format!("{} ms", self.frame_interval_ms),
            3 => self.default_width.clone(),
            4 => self.image_count.to_string(),
            5 => self.charset.name().to_string(),
            6 => format!("{} ms/cell", self.reveal_delay_ms),
            _ => String::new(),
        }
    }

    /// Whether the selected field takes typed text
    pub fn editing_text(&self) -> bool {
        matches!(self.selected_field, 0 | 1 | 3)
    }

    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % Self::FIELD_COUNT;
    }

    pub fn prev_field(&mut self) {
        self.selected_field = self
            .selected_field
            .checked_sub(1)
            .unwrap_or(Self::FIELD_COUNT - 1);
    }

    pub fn push_char(&mut self, c: char) {
        match self.selected_field {
            0 => self.save_folder.push(c),
            1 => self.load_folder.push(c),
            3 if c.is_ascii_digit() => self.default_width.push(c),
            _ => {}
        }
    }

    pub fn pop_char(&mut self) {
        match self.selected_field {
            0 => {
                self.save_folder.pop();
            }
            1 => {
                self.load_folder.pop();
            }
            3 => {
                self.default_width.pop();
            }
            _ => {}
        }
    }

    /// Left/right on a slider-like field
    pub fn adjust(&mut self, increase: bool) {
        match self.selected_field {
            2 => {
                self.frame_interval_ms = if increase {
                    (self.frame_interval_ms + INTERVAL_STEP_MS).min(MAX_FRAME_INTERVAL_MS)
                } else {
                    self.frame_interval_ms
                        .saturating_sub(INTERVAL_STEP_MS)
                        .max(MIN_FRAME_INTERVAL_MS)
                };
            }
            4 => {
                self.image_count = if increase {
                    (self.image_count + 1).min(MAX_IMAGE_COUNT)
                } else {
                    self.image_count.saturating_sub(1).max(1)
                };
            }
            5 => {
                self.charset = if increase {
                    self.charset.next()
                } else {
                    self.charset.prev()
                };
            }
            6 => {
                self.reveal_delay_ms = if increase {
                    (self.reveal_delay_ms + 1).min(MAX_REVEAL_DELAY_MS)
                } else {
                    self.reveal_delay_ms.saturating_sub(1)
                };
            }
            _ => {}
        }
    }

    /// Changes relative to `current`, as a settings update
    pub fn to_update(&self, current: &Settings) -> Result<SettingsUpdate> {
        let default_width = self.default_width.trim().parse::<usize>().map_err(|_| {
            Error::InvalidInput(format!(
                "default width '{}' is not a whole number",
                self.default_width.trim()
            ))
        })?;
        let changed_path = |text: &str, old: &Path| {
            let path = PathBuf::from(text.trim());
            (path != old).then_some(path)
        };

        Ok(SettingsUpdate {
            save_folder: changed_path(&self.save_folder, &current.save_folder),
            load_folder: changed_path(&self.load_folder, &current.load_folder),
            frame_interval_ms: Some(self.frame_interval_ms),
            default_width: Some(default_width),
            image_count: Some(self.image_count),
            charset: Some(self.charset.clone()),
            reveal_delay_ms: Some(self.reveal_delay_ms),
        })
    }
}

/// Generation request still waiting for its result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub request_id: u64,
    pub keyword: String,
    pub done: usize,
    pub total: usize,
}

/// Main application state
pub struct AppState {
    // Configuration
    pub settings: Settings,
    store: SettingsStore,

    // Gallery and animation
    pub gallery: Gallery,
    pub clock: AnimationClock,
    pub reveal_clock: AnimationClock,

    // Form and navigation
    pub form: GenerateForm,
    pub focus: FocusedWidget,
    pub show_help: bool,
    pub should_quit: bool,

    // Overlays
    pub settings_dialog: Option<SettingsDialog>,
    pub load_prompt: Option<LoadPrompt>,
    pub notice: Option<Notice>,

    pub status_message: String,
    pub pending: Option<PendingRequest>,

    // Terminal info
    pub capabilities: TerminalCapabilities,

    worker: WorkerHandle,
    clipboard: Box<dyn ClipboardSink>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        store: SettingsStore,
        capabilities: TerminalCapabilities,
        worker: WorkerHandle,
    ) -> Self {
        let now = Instant::now();
        let clock = AnimationClock::new(Duration::from_millis(settings.frame_interval_ms), now);
        let reveal_clock = AnimationClock::new(Duration::from_millis(settings.reveal_delay_ms), now);
        let form = GenerateForm {
            width: settings.default_width.to_string(),
            ..GenerateForm::default()
        };

        Self {
            settings,
            store,
            gallery: Gallery::new(),
            clock,
            reveal_clock,
            form,
            focus: FocusedWidget::default(),
            show_help: false,
            should_quit: false,
            settings_dialog: None,
            load_prompt: None,
            notice: None,
            status_message: "Ready - Press [?] for help".to_string(),
            pending: None,
            capabilities,
            worker,
            clipboard: Box::new(SystemClipboard::default()),
        }
    }

    pub fn set_clipboard(&mut self, clipboard: Box<dyn ClipboardSink>) {
        self.clipboard = clipboard;
    }

    /// Set status message
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    /// Log an error and show it as a notice
    pub fn show_error(&mut self, error: Error) {
        warn!(kind = error.kind(), %error, "showing error notice");
        self.set_status(format!("{}: {}", error.kind(), error));
        self.notice = Some(Notice::from(&error));
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn toggle_mode(&mut self) {
        self.form.mode = self.form.mode.toggle();
        self.set_status(format!("Mode: {}", self.form.mode.name()));
    }

    /// Enter on the form
    pub fn submit(&mut self) {
        match self.form.mode {
            Mode::Generate => self.submit_generate(),
            Mode::Load => self.open_load_prompt(),
        }
    }

    fn submit_generate(&mut self) {
        let (keyword, width) = match self.form.validate() {
            Ok(valid) => valid,
            Err(e) => return self.show_error(e),
        };

        match self.worker.submit(
            &keyword,
            width,
            self.settings.image_count,
            self.settings.charset.clone(),
        ) {
            Ok(request_id) => {
                info!(request_id, keyword = %keyword, width, "generation requested");
                self.set_status(format!("Searching for '{keyword}'..."));
                self.pending = Some(PendingRequest {
                    request_id,
                    keyword,
                    done: 0,
                    total: self.settings.image_count,
                });
            }
            Err(e) => self.show_error(e),
        }
    }

    fn is_pending(&self, request_id: u64) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|p| p.request_id == request_id)
            && self.worker.is_current(request_id)
    }

    /// Drain every response the worker has posted
    pub fn poll_worker(&mut self) {
        while let Some(response) = self.worker.try_recv() {
            self.handle_worker_response(response);
        }
    }

    /// Handle response from worker thread
    pub fn handle_worker_response(&mut self, response: WorkerResponse) {
        match response {
            WorkerResponse::Progress {
                request_id,
                done,
                total,
            } => {
                if !self.is_pending(request_id) {
                    return;
                }
                if let Some(pending) = self.pending.as_mut() {
                    pending.done = done;
                    pending.total = total;
                }
                self.set_status(format!("Converting images {done}/{total}"));
            }
            WorkerResponse::Generated {
                request_id,
                artworks,
                elapsed_ms,
            } => {
                if !self.is_pending(request_id) {
                    return;
                }
                self.pending = None;
                let count = artworks.len();
                self.gallery.replace(artworks);
                self.focus = FocusedWidget::Gallery;
                self.set_status(format!("Generated {count} artwork(s) in {elapsed_ms}ms"));
            }
            WorkerResponse::Failed { request_id, error } => {
                if !self.is_pending(request_id) {
                    return;
                }
                self.pending = None;
                self.show_error(error);
            }
        }
    }

    /// Advance animations and pending reveals for however many intervals
    /// have passed. A zero reveal delay shows new artworks at once.
    pub fn on_tick(&mut self, now: Instant) {
        let ticks = self.clock.due_ticks(now);
        self.gallery.advance(ticks as usize);

        let reveal_ticks = self.reveal_clock.due_ticks(now);
        if self.settings.reveal_delay_ms == 0 {
            self.gallery.finish_reveals();
        } else {
            self.gallery.reveal(reveal_ticks as usize);
        }
    }

    /// Append artworks without touching the existing ones
    pub fn add_artworks(&mut self, artworks: Vec<AsciiArtwork>) {
        self.gallery.extend(artworks);
    }

    /// Start the interactive load prompt
    pub fn open_load_prompt(&mut self) {
        self.load_prompt = Some(LoadPrompt {
            input: self.settings.load_folder.display().to_string(),
        });
        self.set_status("Enter a .cwi file or folder and press Enter");
    }

    pub fn cancel_load_prompt(&mut self) {
        self.load_prompt = None;
        self.set_status("Load cancelled");
    }

    /// Load the prompt's path. On failure the gallery is left as it was.
    pub fn submit_load_prompt(&mut self) {
        let Some(prompt) = self.load_prompt.take() else {
            return;
        };
        let path = PathBuf::from(prompt.input.trim());

        match load_artworks(&path) {
            Ok((artworks, skipped)) => {
                let count = artworks.len();
                self.gallery.replace(artworks);
                self.focus = FocusedWidget::Gallery;
                if skipped > 0 {
                    self.set_status(format!("Loaded {count} artwork(s), skipped {skipped} unreadable file(s)"));
                } else {
                    self.set_status(format!("Loaded {count} artwork(s)"));
                }
            }
            Err(e) => self.show_error(e),
        }
    }

    pub fn open_settings(&mut self) {
        self.settings_dialog = Some(SettingsDialog::from_settings(&self.settings));
    }

    pub fn cancel_settings(&mut self) {
        self.settings_dialog = None;
    }

    /// Validate and persist the dialog's values. Rejected changes keep the
    /// dialog open and the previous settings in force.
    pub fn apply_settings(&mut self) {
        let Some(dialog) = self.settings_dialog.as_ref() else {
            return;
        };
        let result = dialog
            .to_update(&self.settings)
            .and_then(|update| self.store.update(&self.settings, update));

        match result {
            Ok(settings) => {
                if settings.frame_interval_ms != self.settings.frame_interval_ms {
                    self.clock.set_interval(
                        Duration::from_millis(settings.frame_interval_ms),
                        Instant::now(),
                    );
                }
                if settings.reveal_delay_ms != self.settings.reveal_delay_ms {
                    self.reveal_clock.set_interval(
                        Duration::from_millis(settings.reveal_delay_ms),
                        Instant::now(),
                    );
                }
                self.settings = settings;
                self.settings_dialog = None;
                self.set_status("Settings saved");
            }
            Err(e) => self.show_error(e),
        }
    }

    pub fn select_next(&mut self) {
        self.gallery.select_next();
    }

    pub fn select_prev(&mut self) {
        self.gallery.select_prev();
    }

    /// Enter on the gallery: open the selection or return to the grid
    pub fn toggle_full_view(&mut self) {
        if self.gallery.is_full_view() {
            self.gallery.close();
        } else if !self.gallery.open_selected() {
            self.set_status("Gallery is empty");
        }
    }

    pub fn save_selected(&mut self) {
        let Some(item) = self.gallery.selected() else {
            self.set_status("Nothing selected to save");
            return;
        };
        let result = ArtworkStorage::new(&self.settings.save_folder)
            .and_then(|storage| gallery::save(item, &storage));
        match result {
            Ok(path) => self.set_status(format!("Saved to {}", path.display())),
            Err(e) => self.show_error(e),
        }
    }

    pub fn copy_selected(&mut self) {
        let Some(item) = self.gallery.selected() else {
            self.set_status("Nothing selected to copy");
            return;
        };
        match gallery::copy_plain(item, self.clipboard.as_mut()) {
            Ok(()) => self.set_status("Copied to clipboard"),
            Err(e) => self.show_error(e),
        }
    }

    pub fn remove_selected(&mut self) {
        if let Some(item) = self.gallery.remove_selected() {
            self.set_status(format!("Removed '{}'", item.artwork.title()));
        }
    }
}

/// A folder loads every artwork inside it, a file loads just that one.
/// Returns the artworks and how many files were skipped.
fn load_artworks(path: &Path) -> Result<(Vec<AsciiArtwork>, usize)> {
    if path.as_os_str().is_empty() {
        return Err(Error::invalid_path(path, "path is empty"));
    }
    if path.is_dir() {
        let (artworks, errors) = storage::load_dir(path)?;
        if artworks.is_empty() {
            return Err(errors.into_iter().next().unwrap_or_else(|| {
                Error::NoResults(format!("no .cwi files in {}", path.display()))
            }));
        }
        Ok((artworks, errors.len()))
    } else if path.exists() {
        Ok((vec![storage::load(path)?], 0))
    } else {
        Err(Error::invalid_path(path, "does not exist"))
    }
}
