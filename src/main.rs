//! Main entry point for chromaglyph

use anyhow::{bail, Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    io::{self, Stdout},
    panic,
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::{error, info, warn};

use chromaglyph::{
    config::{Settings, SettingsStore},
    converter::{convert, validate_width},
    image_loader, logging,
    input::handle_event,
    source::BingImageSource,
    state::AppState,
    storage::ArtworkStorage,
    terminal_capabilities::{detect_capabilities, ColorSupport},
    ui,
    worker::spawn_worker,
    AsciiArtwork,
};

/// Target frame time for 60 FPS
const FRAME_TIME_MS: u64 = 16;

const USAGE: &str = "usage: chromaglyph [--image <path>]... [--width N]\n       chromaglyph --render-once --image <path> [--width N]";

/// Command line options
#[derive(Debug, Default)]
struct Args {
    images: Vec<PathBuf>,
    width: Option<usize>,
    render_once: bool,
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<Args> {
    let mut parsed = Args::default();
    let mut iter = args;
    while let Some(a) = iter.next() {
        match a.as_str() {
            "--image" => match iter.next() {
                Some(p) => parsed.images.push(PathBuf::from(p)),
                None => bail!("--image needs a path\n{USAGE}"),
            },
            "--width" => {
                let value = iter.next().context("--width needs a number")?;
                let width = value
                    .parse::<usize>()
                    .with_context(|| format!("--width '{value}' is not a number"))?;
                parsed.width = Some(validate_width(width)?);
            }
            "--render-once" => parsed.render_once = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            other => bail!("unknown argument '{other}'\n{USAGE}"),
        }
    }
    Ok(parsed)
}

fn main() -> Result<()> {
    let args = parse_args(std::env::args().skip(1))?;

    match logging::init(&logging::default_log_dir()) {
        Ok(path) => info!(log = %path.display(), "logging started"),
        Err(e) => eprintln!("Warning: logging disabled: {e}"),
    }

    let store = SettingsStore::open_default();
    let settings = store.load();

    if args.render_once {
        return run_render_once(&args, &settings);
    }

    // Set up panic hook to restore terminal on panic
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    let capabilities = detect_capabilities();
    let source = BingImageSource::new(settings.search_url.clone())?;
    let worker = spawn_worker(Arc::new(source))?;

    let width = args.width.unwrap_or(settings.default_width);
    let mut app_state = AppState::new(settings, store, capabilities, worker);
    app_state.form.width = width.to_string();

    for path in &args.images {
        match convert_local(path, width, &app_state.settings) {
            Ok(artwork) => app_state.add_artworks(vec![artwork]),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not add image");
                app_state.show_error(e);
            }
        }
    }

    let mut terminal = setup_terminal()?;
    let result = run_event_loop(&mut terminal, &mut app_state);
    cleanup_terminal(terminal)?;

    if let Err(e) = &result {
        error!(error = %e, "event loop failed");
    }
    info!("exiting");
    result
}

/// Set up the terminal for TUI rendering
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state
fn cleanup_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Main event loop - handles input, advances animations, processes worker messages, renders UI
fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app_state: &mut AppState,
) -> Result<()> {
    let frame_duration = Duration::from_millis(FRAME_TIME_MS);

    loop {
        let frame_start = Instant::now();

        terminal.draw(|frame| ui::render(frame, app_state))?;

        // Poll for events with timeout
        let timeout = frame_duration.saturating_sub(frame_start.elapsed());
        if event::poll(timeout)? {
            handle_event(event::read()?, app_state);
        }

        app_state.poll_worker();
        app_state.on_tick(Instant::now());

        if app_state.should_quit {
            break;
        }
    }

    Ok(())
}

fn convert_local(path: &Path, width: usize, settings: &Settings) -> chromaglyph::Result<AsciiArtwork> {
    let raster = image_loader::load_path(path)?;
    let title = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "image".to_string());
    convert(&raster, width, &settings.charset, &title)
}

/// Convert one local image without the TUI: save it and print the first
/// frame, coloured when the terminal shows true colour
fn run_render_once(args: &Args, settings: &Settings) -> Result<()> {
    let Some(path) = args.images.first() else {
        bail!("--render-once needs --image <path>\n{USAGE}");
    };
    let width = args.width.unwrap_or(settings.default_width);

    let start = Instant::now();
    let artwork = convert_local(path, width, settings)
        .with_context(|| format!("converting {}", path.display()))?;
    let saved = ArtworkStorage::new(&settings.save_folder)
        .and_then(|storage| storage.save_artwork(&artwork))
        .context("saving artwork")?;

    if detect_capabilities().color_support == ColorSupport::TrueColor {
        print!("{}", artwork.frame(0).ansi_text());
    } else {
        println!("{}", artwork.plain_text(0));
    }
    eprintln!(
        "Saved {} ({}x{}, {} frame(s)) to {} in {}ms",
        artwork.title(),
        artwork.width(),
        artwork.height(),
        artwork.frame_count(),
        saved.display(),
        start.elapsed().as_millis()
    );
    Ok(())
}
