use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use botwatch::source::{build_client, fetch_stats, read_response};
use botwatch::{
    events, ui, AggregateBy, App, DataSource, FileSource, HttpSource, HttpSourceConfig,
};
use botwatch_types::parse_duration;

#[derive(Parser, Debug)]
#[command(name = "botwatch")]
#[command(about = "Terminal dashboard for bot throughput stats")]
struct Args {
    /// Collector base URL
    #[arg(short, long, default_value = "http://localhost:8000", conflicts_with = "file")]
    url: String,

    /// Replay a saved stats response instead of polling a collector.
    /// Pass the --aggregate-by it was exported with.
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Poll interval (e.g., "2s", "500ms")
    #[arg(short, long, default_value = "2s")]
    refresh: String,

    /// Request timeout (e.g., "5s")
    #[arg(long, default_value = "5s")]
    timeout: String,

    /// Initial grouping of table rows
    #[arg(short, long, default_value = "none",
        value_parser = ["none", "ip_address", "topic", "group_id"])]
    aggregate_by: String,

    /// Write logs to this file (the terminal is owned by the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Fetch the current stats once, write them to this JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(ref path) = args.log_file {
        init_logging(path)?;
    }

    let refresh = parse_duration(&args.refresh)?;
    anyhow::ensure!(!refresh.is_zero(), "--refresh must be greater than zero");
    let timeout = parse_duration(&args.timeout)?;
    let aggregation = AggregateBy::parse(&args.aggregate_by);

    let rt = tokio::runtime::Runtime::new()?;

    // Handle export mode (non-interactive)
    if let Some(ref export_path) = args.export {
        return export_to_file(&rt, &args, timeout, aggregation, export_path);
    }

    if let Some(ref path) = args.file {
        let source = Box::new(FileSource::new(path));
        return run_tui(source, aggregation, refresh);
    }

    // HttpSource spawns its poller on the runtime entered here.
    let _guard = rt.enter();
    let config = HttpSourceConfig::new(&args.url)
        .interval(refresh)
        .timeout(timeout)
        .aggregation(aggregation);
    info!(url = %config.base_url, interval = ?refresh, "polling collector");
    let source = Box::new(HttpSource::spawn(config)?);
    run_tui(source, aggregation, Duration::from_millis(100))
}

/// Send tracing output to a file; the UI owns stdout.
fn init_logging(path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

/// Run the TUI with the given data source
fn run_tui(
    source: Box<dyn DataSource>,
    aggregation: AggregateBy,
    reload_interval: Duration,
) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let mut app = App::with_aggregation(source, aggregation);
    let _ = app.reload_data();

    let result = run_app(&mut terminal, &mut app, reload_interval);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    reload_interval: Duration,
) -> Result<()> {
    let mut last_reload = Instant::now();

    while app.running {
        terminal.draw(|frame| ui::draw(frame, app))?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => {
                    events::handle_mouse_event(app, mouse, ui::TABLE_HEADER_ROW);
                }
                _ => {}
            }
        }

        if last_reload.elapsed() >= reload_interval {
            let _ = app.reload_data();
            last_reload = Instant::now();
        }
    }

    Ok(())
}

/// Fetch the current stats once and write them to a JSON file.
fn export_to_file(
    rt: &tokio::runtime::Runtime,
    args: &Args,
    timeout: Duration,
    aggregation: AggregateBy,
    export_path: &Path,
) -> Result<()> {
    let response = match args.file {
        Some(ref path) => read_response(path)?,
        None => {
            let client = build_client(timeout)?;
            rt.block_on(fetch_stats(&client, &args.url, aggregation))
                .with_context(|| format!("failed to fetch stats from {}", args.url))?
        }
    };

    let json = serde_json::to_string_pretty(&response)?;
    std::fs::write(export_path, json)?;

    println!(
        "Exported {} rows to: {}",
        response.len(),
        export_path.display()
    );
    Ok(())
}
