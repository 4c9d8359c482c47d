//! Worker thread management
//!
//! Searching, downloading and converting happen on one background thread so
//! the UI never blocks. Requests carry increasing ids and only the latest one
//! is allowed to deliver results.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, info, warn};

use crate::artwork::AsciiArtwork;
use crate::converter::{convert, validate_width, CharacterSet};
use crate::error::{Error, Result};
use crate::image_loader;
use crate::source::ImageSource;

/// Messages sent from main thread to the worker
#[derive(Debug)]
pub enum WorkerMessage {
    /// Search, download and convert images for a keyword
    Generate {
        request_id: u64,
        keyword: String,
        width: usize,
        count: usize,
        charset: CharacterSet,
    },
    /// Shutdown signal
    Shutdown,
}

/// Responses sent from the worker to main thread
#[derive(Debug)]
pub enum WorkerResponse {
    /// One more image processed (successfully or not)
    Progress {
        request_id: u64,
        done: usize,
        total: usize,
    },
    /// Generation complete
    Generated {
        request_id: u64,
        artworks: Vec<AsciiArtwork>,
        elapsed_ms: u64,
    },
    /// Generation failed as a whole
    Failed { request_id: u64, error: Error },
}

/// Shared record of the most recent request id
#[derive(Debug, Clone, Default)]
pub struct GenerationTicket(Arc<AtomicU64>);

impl GenerationTicket {
    /// Claim the next id, superseding every earlier one
    pub fn issue(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn latest(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, request_id: u64) -> bool {
        self.latest() == request_id
    }
}

/// Handle to the worker thread and its channels
pub struct WorkerHandle {
    request_tx: Sender<WorkerMessage>,
    response_rx: Receiver<WorkerResponse>,
    ticket: GenerationTicket,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Queue a generation request and return its id
    pub fn submit(
        &self,
        keyword: &str,
        width: usize,
        count: usize,
        charset: CharacterSet,
    ) -> Result<u64> {
        let request_id = self.ticket.issue();
        self.request_tx
            .send(WorkerMessage::Generate {
                request_id,
                keyword: keyword.to_string(),
                width,
                count,
                charset,
            })
            .map_err(|_| worker_gone())?;
        Ok(request_id)
    }

    /// Next pending response, if any
    pub fn try_recv(&self) -> Option<WorkerResponse> {
        self.response_rx.try_recv().ok()
    }

    pub fn responses(&self) -> &Receiver<WorkerResponse> {
        &self.response_rx
    }

    pub fn is_current(&self, request_id: u64) -> bool {
        self.ticket.is_current(request_id)
    }

    /// Stop the worker and wait for it to exit. Blocks until any download
    /// in flight has returned.
    pub fn shutdown(mut self) {
        self.signal_stop();
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }

    fn signal_stop(&self) {
        // Supersede whatever is running so it stops at the next image
        self.ticket.issue();
        let _ = self.request_tx.send(WorkerMessage::Shutdown);
    }
}

impl Drop for WorkerHandle {
    /// Signals the worker without joining it, so quitting never waits on a
    /// slow download. The detached thread exits once its fetch returns.
    fn drop(&mut self) {
        if self.thread.take().is_some() {
            self.signal_stop();
        }
    }
}

fn worker_gone() -> Error {
    Error::Io(io::Error::new(
        io::ErrorKind::BrokenPipe,
        "worker thread stopped",
    ))
}

/// Spawn the generation worker
pub fn spawn_worker(source: Arc<dyn ImageSource>) -> Result<WorkerHandle> {
    let (request_tx, request_rx) = unbounded::<WorkerMessage>();
    let (response_tx, response_rx) = unbounded::<WorkerResponse>();
    let ticket = GenerationTicket::default();

    let worker_ticket = ticket.clone();
    let thread = thread::Builder::new()
        .name("generate-worker".to_string())
        .spawn(move || worker_loop(source.as_ref(), &worker_ticket, request_rx, response_tx))?;

    Ok(WorkerHandle {
        request_tx,
        response_rx,
        ticket,
        thread: Some(thread),
    })
}

/// Main worker loop - processes messages until shutdown
fn worker_loop(
    source: &dyn ImageSource,
    ticket: &GenerationTicket,
    rx: Receiver<WorkerMessage>,
    tx: Sender<WorkerResponse>,
) {
    while let Ok(msg) = rx.recv() {
        match msg {
            WorkerMessage::Shutdown => break,

            WorkerMessage::Generate {
                request_id,
                keyword,
                width,
                count,
                charset,
            } => {
                if !ticket.is_current(request_id) {
                    debug!(request_id, "skipping superseded request");
                    continue;
                }

                let start = Instant::now();
                let result = generate(
                    source,
                    &keyword,
                    width,
                    count,
                    &charset,
                    || ticket.is_current(request_id),
                    |done, total| {
                        let _ = tx.send(WorkerResponse::Progress {
                            request_id,
                            done,
                            total,
                        });
                    },
                );

                if !ticket.is_current(request_id) {
                    debug!(request_id, "dropping superseded result");
                    continue;
                }

                let response = match result {
                    Ok(artworks) => {
                        let elapsed_ms = start.elapsed().as_millis() as u64;
                        info!(request_id, count = artworks.len(), elapsed_ms, "generation complete");
                        WorkerResponse::Generated {
                            request_id,
                            artworks,
                            elapsed_ms,
                        }
                    }
                    Err(error) => {
                        warn!(request_id, %error, "generation failed");
                        WorkerResponse::Failed { request_id, error }
                    }
                };

                let _ = tx.send(response);
            }
        }
    }
}

/// Search for `keyword` and convert up to `count` results at `width`.
///
/// Images that fail to download or decode are skipped. `keep_going` is
/// polled before each download and again before converting it; once it
/// returns false the artworks converted so far are returned. Fails with [`Error::NoResults`] when nothing converts.
pub fn generate(
    source: &dyn ImageSource,
    keyword: &str,
    width: usize,
    count: usize,
    charset: &CharacterSet,
    keep_going: impl Fn() -> bool,
    mut progress: impl FnMut(usize, usize),
) -> Result<Vec<AsciiArtwork>> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err(Error::InvalidInput("keyword must not be empty".into()));
    }
    let width = validate_width(width)?;

    let refs = source.search(keyword, count)?;
    let total = refs.len();
    let mut artworks = Vec::with_capacity(total);

    for (i, image_ref) in refs.iter().enumerate() {
        if !keep_going() {
            debug!(keyword, converted = artworks.len(), "generation interrupted");
            return Ok(artworks);
        }

        let fetched = source.fetch(image_ref);
        if !keep_going() {
            debug!(keyword, converted = artworks.len(), "generation interrupted after download");
            return Ok(artworks);
        }
        let converted = fetched
            .and_then(|bytes| image_loader::decode(&bytes))
            .and_then(|raster| convert(&raster, width, charset, keyword));
        match converted {
            Ok(artwork) => artworks.push(artwork),
            Err(e) => warn!(url = %image_ref.url, error = %e, "skipping image"),
        }
        progress(i + 1, total);
    }

    if artworks.is_empty() {
        return Err(Error::NoResults(keyword.to_string()));
    }
    Ok(artworks)
}
