use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use xping::config::{Overrides, RuntimeConfig, Settings};
use xping::feed::{self, FeedPublisher};
use xping::monitor::{Bell, Monitor, Scheduler, SortKey};
use xping::probe::{Probe, SystemPing};
use xping::ui::{self, Theme};
use xping::{events, App};

/// How often the dashboard polls for input and redraws.
const FRAME_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Parser, Debug)]
#[command(name = "xping", version)]
#[command(about = "Terminal ping dashboard: RTT, jitter, loss and history for many hosts")]
struct Args {
    /// Hosts to monitor
    #[arg(long, num_args = 1..)]
    hosts: Option<Vec<String>>,

    /// Rest between sweeps, in seconds or with a unit (e.g., "500ms", "2s")
    #[arg(short, long)]
    interval: Option<String>,

    /// Number of recent probes used for the loss percentage
    #[arg(long)]
    loss_window: Option<usize>,

    /// Number of samples kept in each host's history
    #[arg(long)]
    hist_size: Option<usize>,

    /// Per-probe timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Initial sort key
    #[arg(long, value_enum)]
    sort: Option<SortKey>,

    /// Sort in descending order
    #[arg(long)]
    descending: bool,

    /// Stream JSON lines to stdout instead of the dashboard
    #[arg(long)]
    json: bool,

    /// Beep on every successful reply
    #[arg(long)]
    beep: bool,

    /// Settings file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write logs to this file while the dashboard is running
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            hosts: self.hosts.clone(),
            interval: self.interval.clone(),
            loss_window: self.loss_window,
            hist_size: self.hist_size,
            timeout_ms: self.timeout_ms,
            sort: self.sort,
            descending: self.descending,
            json: self.json,
            beep: self.beep,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    settings.apply(args.overrides());
    init_logging(settings.json, args.log_file.as_deref())?;
    let config = settings.validate()?;

    tracing::info!(
        hosts = ?config.hosts,
        interval = ?config.schedule.interval,
        timeout = ?config.schedule.timeout,
        loss_window = config.capacities.loss_window,
        hist_size = config.capacities.history,
        "Starting xping"
    );

    let probe = SystemPing::new();
    let tool_missing = !probe.is_available();
    if tool_missing {
        tracing::warn!(
            probe = probe.description(),
            "ping tool not found on PATH; every probe will time out"
        );
    }

    let monitor = Monitor::new(config.hosts.iter().cloned(), config.capacities);
    let bell = Arc::new(Bell::new(config.beep));
    let scheduler = Scheduler::new(monitor.clone(), Arc::new(probe), config.schedule)
        .with_alert(bell.clone());

    let rt = tokio::runtime::Runtime::new()?;

    if config.json {
        rt.block_on(run_feed(scheduler, monitor, bell, &config))
    } else {
        let handle = {
            let _guard = rt.enter();
            scheduler.start()
        };
        let result = run_tui(monitor, bell, &config, tool_missing);
        rt.block_on(handle.shutdown());
        result
    }
}

/// Logs go to stderr in feed mode; the dashboard owns the terminal, so there
/// they go to `--log-file` or nowhere.
fn init_logging(json: bool, log_file: Option<&std::path::Path>) -> Result<()> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    if json {
        tracing_subscriber::registry()
            .with(filter())
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    } else if let Some(path) = log_file {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        tracing_subscriber::registry()
            .with(filter())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    }

    Ok(())
}

/// Headless mode: publish snapshots until Ctrl+C or SIGTERM.
async fn run_feed(
    scheduler: Scheduler,
    monitor: Monitor,
    bell: Arc<Bell>,
    config: &RuntimeConfig,
) -> Result<()> {
    let handle = scheduler.start();

    let (stop_tx, stop_rx) = watch::channel(false);
    let mut publisher = FeedPublisher::new(monitor, tokio::io::stdout())
        .sort(config.sort, config.descending)
        .cadence(feed::cadence_for(config.schedule.interval))
        .bell(bell);
    let feed = tokio::spawn(async move { publisher.run(stop_rx).await });

    shutdown_signal().await;

    stop_tx.send_replace(true);
    handle.shutdown().await;
    feed.await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal");
        }
    }
}

/// Run the dashboard until the user quits.
fn run_tui(
    monitor: Monitor,
    bell: Arc<Bell>,
    config: &RuntimeConfig,
    tool_missing: bool,
) -> Result<()> {
    let theme = Theme::auto_detect();

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

    let mut app = App::new(
        monitor,
        bell,
        config.thresholds,
        config.sort,
        config.descending,
        theme,
    );
    if tool_missing {
        app.set_status_message("ping not found on PATH: all hosts will show 100% loss".to_string());
    }

    let result = run_app(&mut terminal, &mut app);

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

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while app.running {
        app.refresh();
        terminal.draw(|frame| ui::render(frame, app))?;

        if app.take_beep() {
            let backend = terminal.backend_mut();
            backend.write_all(b"\x07")?;
            backend.flush()?;
        }

        if let Some(event) = events::poll_event(FRAME_INTERVAL)? {
            match event {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    events::handle_key_event(app, key)
                }
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse, ui::FIRST_HOST_ROW),
                // Terminal will redraw on next iteration
                _ => {}
            }
        }
    }

    Ok(())
}
