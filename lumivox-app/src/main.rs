//! Lumivox - button-operated light and voice-note gadget
//!
//! Desktop host: a directory stands in for the SD card, the default output
//! device for the paired speaker, and the terminal for the button panel and
//! the RGB strip.

use std::fs::{self, File};
use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    style::{Color, StyledContent, Stylize},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    widgets::Block,
    Frame, Terminal,
};
use tracing_subscriber::EnvFilter;

use lumivox_audio::{create_engine, AudioSink, ConnectionState, CpalSink, PlaybackController};
use lumivox_control::{key_action, ButtonLevels, Clock, Device, KeyAction, SystemClock};
use lumivox_library::{Config, DirStorage};
use lumivox_lights::{Indicator, IndicatorState, Inverted, Rgb};
use lumivox_tui::{App, CatalogWidget, LedStripWidget, StatusBarWidget};

type HostDevice = Device<DirStorage, Pcg32>;
type HostIndicator = Inverted<IndicatorState>;

fn main() -> anyhow::Result<()> {
    let log_path = init_logging()?;

    let mut config = Config::load();
    if !Config::config_path().exists() {
        // First run: leave an editable file with the defaults
        if let Err(e) = config.save() {
            tracing::warn!("Could not write default config: {}", e);
        }
    }
    if let Some(dir) = std::env::args_os().nth(1) {
        config.audio_dir = Some(PathBuf::from(dir));
    }
    tracing::info!(?config, "starting lumivox");

    let mut indicator = Inverted::new(IndicatorState::default());

    let audio_dir = config.audio_dir.clone().unwrap_or_else(default_audio_dir);
    let storage = match DirStorage::mount(&audio_dir) {
        Ok(storage) => storage,
        Err(e) => {
            let error = anyhow::Error::new(e).context("mounting voice note storage");
            return halt(&mut indicator, error, &log_path);
        }
    };

    // The stream must outlive the control loop
    let (playback, sink) = open_audio(&config);

    let seed = config.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, "lottery seed");
    let rng = Pcg32::seed_from_u64(seed);

    let mut device = match Device::boot(storage, playback, rng, config.settle_ms) {
        Ok(device) => device,
        Err(e) => {
            let error = anyhow::Error::new(e)
                .context(format!("booting from {}", audio_dir.display()));
            return halt(&mut indicator, error, &log_path);
        }
    };

    let mut app = App::new();
    if let Some(ref theme) = config.theme {
        app.state.set_theme(theme);
    }
    app.state.sync(&device, 0);
    app.state.set_message(format!(
        "{} voice notes from {}",
        app.state.catalog_total(),
        audio_dir.display()
    ));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(
        &mut terminal,
        &mut app,
        &mut device,
        sink.as_ref(),
        &mut indicator,
        Duration::from_millis(config.poll_interval_ms),
    );

    // Cleanup
    indicator.clear();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("shutting down");
    result
}

/// Log to a file; the terminal belongs to the front panel
fn init_logging() -> anyhow::Result<PathBuf> {
    let dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lumivox");
    fs::create_dir_all(&dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;

    let path = dir.join("lumivox.log");
    let file = File::options()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lumivox=info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(path)
}

fn default_audio_dir() -> PathBuf {
    dirs::audio_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lumivox")
}

/// Start the output stream. Without a working device the gadget still runs,
/// reported as disconnected.
fn open_audio(config: &Config) -> (PlaybackController, Option<CpalSink>) {
    let mut sink = match CpalSink::open(config.output_rate) {
        Ok(sink) => sink,
        Err(e) => {
            tracing::warn!("Audio output unavailable: {}", e);
            let (playback, _engine) = create_engine(config.source_rate, config.output_rate);
            return (playback, None);
        }
    };

    let (playback, engine) = create_engine(config.source_rate, sink.sample_rate());
    match sink.start(engine) {
        Ok(()) => {
            tracing::info!(rate = sink.sample_rate(), "audio output started");
            (playback, Some(sink))
        }
        Err(e) => {
            tracing::warn!("Audio output unavailable: {}", e);
            (playback, None)
        }
    }
}

/// Solid red, logged, exit non-zero. The terminal panel is not up yet, so
/// the indicator is shown as a lamp on stderr.
fn halt(
    indicator: &mut HostIndicator,
    error: anyhow::Error,
    log_path: &std::path::Path,
) -> anyhow::Result<()> {
    indicator.set_color(Rgb::RED);
    indicator.set_status(false);
    tracing::error!("halted: {:#}", error);

    eprintln!(
        "{} lumivox halted (log: {})",
        lamp(indicator.inner()),
        log_path.display()
    );
    Err(error)
}

/// Strip color as a terminal glyph, undoing the common-anode inversion
fn lamp(pins: &IndicatorState) -> StyledContent<&'static str> {
    let color = pins.color.inverted();
    "■"
        .with(Color::Rgb {
            r: color.r,
            g: color.g,
            b: color.b,
        })
        .bold()
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    device: &mut HostDevice,
    sink: Option<&CpalSink>,
    indicator: &mut HostIndicator,
    poll_interval: Duration,
) -> anyhow::Result<()> {
    let clock = SystemClock::new();
    let mut deadline = Instant::now();

    while !app.should_quit {
        let connected = sink.is_some_and(|s| s.connection() == ConnectionState::Connected);
        device.set_connected(connected);

        let levels = read_buttons(app, deadline)?;
        // A slow frame shifts the schedule instead of bursting ticks
        deadline = (deadline + poll_interval).max(Instant::now());

        let now = clock.now_ms();
        let effects = device.tick(now, &levels);
        effects.apply(indicator);

        app.state.record(&effects);
        app.state.set_pin_color(indicator.inner().color);
        app.state.sync(device, now);

        terminal.draw(|frame| render_ui(frame, &*app))?;
    }

    Ok(())
}

/// Collect key presses until `deadline`. Each press holds its button high
/// for exactly one poll.
fn read_buttons(app: &mut App, deadline: Instant) -> io::Result<ButtonLevels> {
    let mut levels = ButtonLevels::default();

    loop {
        let now = Instant::now();
        if now >= deadline || app.should_quit {
            return Ok(levels);
        }
        if !event::poll(deadline - now)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key_action(key) {
                Some(KeyAction::Press(button)) => levels.set(button, true),
                Some(KeyAction::Quit) => app.quit(),
                None => {}
            }
        }
    }
}

fn render_ui(frame: &mut Frame, app: &App) {
    let state = &app.state;
    let theme = &state.theme;
    let area = frame.area();

    frame.render_widget(Block::default().style(theme.normal()), area);

    let rows = Layout::vertical([
        Constraint::Min(8),    // Strip + catalog
        Constraint::Length(1), // Status bar
    ])
    .split(area);
    let panes = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    frame.render_widget(
        LedStripWidget::new(state.color, theme)
            .pins(state.pin_color)
            .status(state.status_led)
            .lights(state.lights),
        panes[0],
    );
    frame.render_widget(
        CatalogWidget::new(state.category_counts, theme)
            .now_playing(state.now_playing.as_deref()),
        panes[1],
    );
    frame.render_widget(
        StatusBarWidget::new(state.mode, theme)
            .progress(state.countdown, state.phase)
            .connected(state.connected)
            .message(state.message.as_deref(), state.message_type),
        rows[1],
    );
}
