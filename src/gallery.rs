//! Gallery model
//!
//! Holds the artworks on screen, each with its own frame index, and a single
//! clock that decides when all animated items advance. A newly shown artwork
//! appears cell by cell in shuffled order before it is drawn whole.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::artwork::{AsciiArtwork, AsciiFrame};
use crate::error::Result;
use crate::storage::ArtworkStorage;

/// Which cells of a newly shown artwork are visible so far
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reveal {
    order: Vec<usize>,
    shown: Vec<bool>,
    next: usize,
}

impl Reveal {
    /// Every cell index in `0..cells`, revealed in random order
    pub fn shuffled(cells: usize) -> Self {
        let mut order: Vec<usize> = (0..cells).collect();
        order.shuffle(&mut rand::thread_rng());
        Self::in_order(order)
    }

    fn in_order(order: Vec<usize>) -> Self {
        Self {
            shown: vec![false; order.len()],
            order,
            next: 0,
        }
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Show up to `cells` more cells
    pub fn step(&mut self, cells: usize) {
        let end = self.next.saturating_add(cells).min(self.order.len());
        for &index in &self.order[self.next..end] {
            self.shown[index] = true;
        }
        self.next = end;
    }

    pub fn is_shown(&self, index: usize) -> bool {
        self.shown.get(index).copied().unwrap_or(true)
    }

    pub fn is_complete(&self) -> bool {
        self.next >= self.order.len()
    }

    /// Cells shown and total
    pub fn progress(&self) -> (usize, usize) {
        (self.next, self.order.len())
    }
}

/// One artwork and the frame currently shown
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryItem {
    pub artwork: AsciiArtwork,
    pub frame_index: usize,
    /// `None` once every cell has been revealed
    pub reveal: Option<Reveal>,
}

impl GalleryItem {
    pub fn new(artwork: AsciiArtwork) -> Self {
        let cells = artwork.width() * artwork.height();
        Self {
            artwork,
            frame_index: 0,
            reveal: Some(Reveal::shuffled(cells)),
        }
    }

    /// Show `cells` more cells of a pending reveal
    pub fn reveal_step(&mut self, cells: usize) {
        if let Some(reveal) = self.reveal.as_mut() {
            reveal.step(cells);
            if reveal.is_complete() {
                self.reveal = None;
            }
        }
    }

    pub fn is_revealing(&self) -> bool {
        self.reveal.is_some()
    }

    pub fn current_frame(&self) -> &AsciiFrame {
        self.artwork.frame(self.frame_index)
    }

    /// Move `steps` frames forward, wrapping to the first frame
    pub fn advance(&mut self, steps: usize) {
        let count = self.artwork.frame_count();
        self.frame_index = (self.frame_index + steps % count) % count;
    }

    /// What the clipboard receives: the current frame's characters only
    pub fn plain_text(&self) -> String {
        self.artwork.plain_text(self.frame_index)
    }
}

/// Ordered collection of displayed artworks
#[derive(Debug, Default)]
pub struct Gallery {
    items: Vec<GalleryItem>,
    selected: usize,
    full_view: bool,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop everything and show `artworks` instead
    pub fn replace(&mut self, artworks: Vec<AsciiArtwork>) {
        self.items = artworks.into_iter().map(GalleryItem::new).collect();
        self.selected = 0;
        self.full_view = false;
    }

    /// Append `artworks` after the current items
    pub fn extend(&mut self, artworks: Vec<AsciiArtwork>) {
        self.items.extend(artworks.into_iter().map(GalleryItem::new));
    }

    /// Advance every animated item by one frame
    pub fn tick(&mut self) {
        self.advance(1);
    }

    pub fn advance(&mut self, steps: usize) {
        if steps == 0 {
            return;
        }
        for item in self.items.iter_mut().filter(|i| i.artwork.is_animated()) {
            item.advance(steps);
        }
    }

    /// Reveal `cells` more cells of every item still appearing
    pub fn reveal(&mut self, cells: usize) {
        if cells == 0 {
            return;
        }
        for item in self.items.iter_mut() {
            item.reveal_step(cells);
        }
    }

    /// Show every item whole
    pub fn finish_reveals(&mut self) {
        for item in self.items.iter_mut() {
            item.reveal = None;
        }
    }

    pub fn is_revealing(&self) -> bool {
        self.items.iter().any(GalleryItem::is_revealing)
    }

    pub fn selected_index(&self) -> Option<usize> {
        (!self.items.is_empty()).then_some(self.selected)
    }

    pub fn selected(&self) -> Option<&GalleryItem> {
        self.items.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + 1) % self.items.len();
        }
    }

    pub fn select_prev(&mut self) {
        if !self.items.is_empty() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.items.len() - 1);
        }
    }

    /// Remove the selected item, keeping the selection in range
    pub fn remove_selected(&mut self) -> Option<GalleryItem> {
        if self.selected >= self.items.len() {
            return None;
        }
        let removed = self.items.remove(self.selected);
        if self.selected >= self.items.len() {
            self.selected = self.items.len().saturating_sub(1);
        }
        if self.items.is_empty() {
            self.full_view = false;
        }
        debug!(title = removed.artwork.title(), "removed from gallery");
        Some(removed)
    }

    /// Show the selected item alone, restarting its animation
    pub fn open_selected(&mut self) -> bool {
        match self.items.get_mut(self.selected) {
            Some(item) => {
                item.frame_index = 0;
                self.full_view = true;
                true
            }
            None => false,
        }
    }

    pub fn close(&mut self) {
        self.full_view = false;
    }

    pub fn is_full_view(&self) -> bool {
        self.full_view
    }

    /// Largest width and height among the items
    pub fn max_dimensions(&self) -> (usize, usize) {
        self.items.iter().fold((0, 0), |(w, h), item| {
            (w.max(item.artwork.width()), h.max(item.artwork.height()))
        })
    }
}

/// Shared animation timer
#[derive(Debug, Clone)]
pub struct AnimationClock {
    interval: Duration,
    next_due: Instant,
}

impl AnimationClock {
    pub fn new(interval: Duration, now: Instant) -> Self {
        let interval = interval.max(Duration::from_millis(1));
        Self {
            interval,
            next_due: now + interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of interval boundaries passed since the previous call
    pub fn due_ticks(&mut self, now: Instant) -> u32 {
        if now < self.next_due {
            return 0;
        }
        let late = now.duration_since(self.next_due).as_nanos();
        let ticks = 1 + late / self.interval.as_nanos();
        self.next_due += self.interval * u32::try_from(ticks).unwrap_or(u32::MAX);
        u32::try_from(ticks).unwrap_or(u32::MAX)
    }

    /// New interval, counted from `now`
    pub fn set_interval(&mut self, interval: Duration, now: Instant) {
        self.interval = interval.max(Duration::from_millis(1));
        self.next_due = now + self.interval;
    }
}

/// Destination for copied text
pub trait ClipboardSink {
    fn set_text(&mut self, text: String) -> Result<()>;
}

/// The system clipboard, opened on first use
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: String) -> Result<()> {
        // Kept open: on X11 the contents vanish with the handle
        if self.inner.is_none() {
            self.inner = Some(arboard::Clipboard::new()?);
        }
        if let Some(clipboard) = self.inner.as_mut() {
            clipboard.set_text(text)?;
        }
        Ok(())
    }
}

/// Copy the item's current frame as plain text
pub fn copy_plain(item: &GalleryItem, clipboard: &mut dyn ClipboardSink) -> Result<()> {
    clipboard.set_text(item.plain_text())?;
    info!(title = item.artwork.title(), "copied to clipboard");
    Ok(())
}

/// Save the item's artwork into the storage folder
pub fn save(item: &GalleryItem, storage: &ArtworkStorage) -> Result<PathBuf> {
    storage.save_artwork(&item.artwork)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artwork::Cell;
    use crate::color_space::Rgb;
    use crate::error::Error;

    fn frame(text: &str, width: usize) -> AsciiFrame {
        let cells: Vec<Cell> = text
            .chars()
            .filter(|c| *c != '\n')
            .map(|c| Cell::new(c, Rgb::new(90, 180, 30)))
            .collect();
        let height = cells.len() / width;
        AsciiFrame::new(width, height, cells).unwrap()
    }

    fn animated(frames: &[&str]) -> AsciiArtwork {
        AsciiArtwork::new("anim", frames.iter().map(|f| frame(f, 2)).collect()).unwrap()
    }

    fn still(title: &str) -> AsciiArtwork {
        AsciiArtwork::new(title, vec![frame("..", 2)]).unwrap()
    }

    #[derive(Default)]
    struct RecordingClipboard(Vec<String>);

    impl ClipboardSink for RecordingClipboard {
        fn set_text(&mut self, text: String) -> Result<()> {
            self.0.push(text);
            Ok(())
        }
    }

    struct BrokenClipboard;

    impl ClipboardSink for BrokenClipboard {
        fn set_text(&mut self, _text: String) -> Result<()> {
            Err(Error::Clipboard("no display".into()))
        }
    }

    #[test]
    fn test_tick_wraps_and_skips_static() {
        let mut gallery = Gallery::new();
        gallery.replace(vec![animated(&["a\nb", "c\nd", "e\nf"]), still("s")]);

        gallery.tick();
        gallery.tick();
        assert_eq!(gallery.items()[0].frame_index, 2);
        gallery.tick();
        assert_eq!(gallery.items()[0].frame_index, 0);
        assert_eq!(gallery.items()[1].frame_index, 0);

        gallery.advance(7);
        assert_eq!(gallery.items()[0].frame_index, 1);
    }

    #[test]
    fn test_clock_200ms_scenario() {
        let start = Instant::now();
        let mut clock = AnimationClock::new(Duration::from_millis(200), start);
        let mut gallery = Gallery::new();
        gallery.replace(vec![animated(&["ab", "cd", "ef"])]);

        let mut seen = Vec::new();
        for ms in (0..=800).step_by(50) {
            let ticks = clock.due_ticks(start + Duration::from_millis(ms));
            gallery.advance(ticks as usize);
            seen.push(gallery.items()[0].frame_index);
        }

        // One advance per 200 ms, wrapping after the third frame
        assert_eq!(
            seen,
            vec![0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 0, 0, 0, 0, 1]
        );
    }

    #[test]
    fn test_clock_catches_up() {
        let start = Instant::now();
        let mut clock = AnimationClock::new(Duration::from_millis(100), start);
        assert_eq!(clock.due_ticks(start + Duration::from_millis(350)), 3);
        assert_eq!(clock.due_ticks(start + Duration::from_millis(399)), 0);
        assert_eq!(clock.due_ticks(start + Duration::from_millis(400)), 1);
    }

    #[test]
    fn test_set_interval_restarts_timer() {
        let start = Instant::now();
        let mut clock = AnimationClock::new(Duration::from_millis(200), start);
        let later = start + Duration::from_millis(150);
        clock.set_interval(Duration::from_millis(500), later);
        assert_eq!(clock.interval(), Duration::from_millis(500));
        assert_eq!(clock.due_ticks(start + Duration::from_millis(600)), 0);
        assert_eq!(clock.due_ticks(start + Duration::from_millis(650)), 1);
    }

    #[test]
    fn test_selection_and_removal() {
        let mut gallery = Gallery::new();
        assert_eq!(gallery.selected_index(), None);
        gallery.replace(vec![still("a"), still("b"), still("c")]);

        gallery.select_prev();
        assert_eq!(gallery.selected().unwrap().artwork.title(), "c");
        gallery.select_next();
        assert_eq!(gallery.selected_index(), Some(0));

        gallery.select_prev();
        let removed = gallery.remove_selected().unwrap();
        assert_eq!(removed.artwork.title(), "c");
        assert_eq!(gallery.selected().unwrap().artwork.title(), "b");

        gallery.remove_selected();
        gallery.remove_selected();
        assert!(gallery.is_empty());
        assert!(gallery.remove_selected().is_none());
    }

    #[test]
    fn test_open_restarts_animation() {
        let mut gallery = Gallery::new();
        gallery.replace(vec![animated(&["ab", "cd"])]);
        gallery.tick();
        assert!(gallery.open_selected());
        assert!(gallery.is_full_view());
        assert_eq!(gallery.items()[0].frame_index, 0);
        gallery.close();
        assert!(!gallery.is_full_view());
    }

    #[test]
    fn test_extend_keeps_existing() {
        let mut gallery = Gallery::new();
        gallery.replace(vec![still("a")]);
        gallery.extend(vec![still("b")]);
        assert_eq!(gallery.len(), 2);
        assert_eq!(gallery.max_dimensions(), (2, 1));
    }

    #[test]
    fn test_copy_current_frame() {
        let mut gallery = Gallery::new();
        gallery.replace(vec![animated(&["#+\n-.", "@@\n%%"])]);
        gallery.tick();

        let mut clipboard = RecordingClipboard::default();
        copy_plain(gallery.selected().unwrap(), &mut clipboard).unwrap();
        insta::assert_snapshot!(clipboard.0[0], @r"
        @@
        %%
        ");
    }

    #[test]
    fn test_reveal_covers_every_cell_once() {
        let mut reveal = Reveal::shuffled(60);
        let mut order = reveal.order().to_vec();
        order.sort_unstable();
        assert_eq!(order, (0..60).collect::<Vec<_>>());

        let mut seen = Vec::new();
        while !reveal.is_complete() {
            let before: Vec<bool> = (0..60).map(|i| reveal.is_shown(i)).collect();
            reveal.step(7);
            for (i, was) in before.iter().enumerate() {
                if !was && reveal.is_shown(i) {
                    seen.push(i);
                }
            }
        }
        // Each step uncovers only new cells, and all of them end up shown
        assert_eq!(seen.len(), 60);
        assert_eq!(seen, reveal.order());
        assert_eq!(reveal.progress(), (60, 60));
    }

    #[test]
    fn test_reveal_follows_order() {
        let mut reveal = Reveal::in_order(vec![2, 0, 1]);
        reveal.step(1);
        assert!(reveal.is_shown(2));
        assert!(!reveal.is_shown(0));
        reveal.step(usize::MAX);
        assert!(reveal.is_complete());
        assert!((0..3).all(|i| reveal.is_shown(i)));
    }

    #[test]
    fn test_new_items_reveal_then_settle() {
        let mut gallery = Gallery::new();
        gallery.replace(vec![animated(&["ab\ncd", "ef\ngh"])]);
        assert!(gallery.is_revealing());

        gallery.reveal(3);
        assert_eq!(gallery.items()[0].reveal.as_ref().unwrap().progress(), (3, 4));
        gallery.reveal(1);
        assert!(!gallery.is_revealing());
        assert!(gallery.items()[0].reveal.is_none());

        // Reopening restarts the animation but not the reveal
        gallery.open_selected();
        assert!(!gallery.is_revealing());

        gallery.extend(vec![still("late")]);
        assert!(gallery.is_revealing());
        gallery.finish_reveals();
        assert!(!gallery.is_revealing());
    }

    #[test]
    fn test_copy_failure_is_reported() {
        let item = GalleryItem::new(still("x"));
        let err = copy_plain(&item, &mut BrokenClipboard).unwrap_err();
        assert!(matches!(err, Error::Clipboard(_)));
    }

    #[test]
    fn test_save_uses_storage_folder() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ArtworkStorage::new(dir.path()).unwrap();
        let item = GalleryItem::new(still("saved"));
        let path = save(&item, &storage).unwrap();
        assert!(path.starts_with(dir.path()));
        assert_eq!(crate::storage::load(&path).unwrap(), item.artwork);
    }
}
