//! aview - SLURM job table and Adams solver message browser.

mod print;
mod watcher;

use aview_cli::{Args, Command};
use aview_core::same_path;
use aview_highlight::{LanguageRegistry, languages::adams_msg};
use aview_monitor::{App, Theme};
use aview_slurm::load_job_table;
use camino::Utf8Path;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use miette::{IntoDiagnostic, Result, WrapErr};
use ratatui::prelude::*;
use std::fs::File;
use std::io;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use watcher::{FileWatcher, WatcherEvent};

/// Environment variable holding tracing filter directives.
const LOG_ENV: &str = "AVIEW_LOG";

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_deref(), args.command.is_none())?;

    match &args.command {
        Some(Command::Highlight {
            file,
            language,
            format,
        }) => print::highlight_file(file, language, *format),
        Some(Command::Jobs { file, filter }) => print::job_table(file, filter),
        None => run_monitor(&args),
    }
}

/// Log to `log_file`, or to stderr outside the TUI.
fn init_tracing(log_file: Option<&Utf8Path>, interactive: bool) -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to create log file {}", path))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        // The terminal belongs to the TUI
        None if interactive => {}
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
    }
    Ok(())
}

fn run_monitor(args: &Args) -> Result<()> {
    let theme: Theme = args.theme.parse().into_diagnostic()?;
    let registry = LanguageRegistry::with_builtin().into_diagnostic()?;
    let language = registry.require(adams_msg::ID).into_diagnostic()?.clone();

    let jobs = match &args.jobs {
        Some(path) => load_job_table(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to load {}", path))?,
        None => Vec::new(),
    };
    tracing::info!("Loaded {} jobs", jobs.len());

    let mut app = App::new(jobs, language)
        .with_theme(theme)
        .with_date_filter(args.filter.filter(), args.filter.date_column.column());
    if let Some(path) = &args.jobs {
        app = app.with_jobs_path(path.clone());
    }
    if let Some(path) = &args.msg {
        app = app.with_message_file(path.clone());
    }

    let mut watcher = FileWatcher::new()?;
    if let Some(path) = app.jobs_path() {
        watcher.watch_jobs(path)?;
    }

    // Setup terminal
    enable_raw_mode().into_diagnostic()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture).into_diagnostic()?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).into_diagnostic()?;

    let res = run_app(&mut terminal, &mut app, &mut watcher);

    // Restore terminal
    disable_raw_mode().into_diagnostic()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .into_diagnostic()?;
    terminal.show_cursor().into_diagnostic()?;

    res.into_diagnostic()
}

/// Main application loop.
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    watcher: &mut FileWatcher,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(100);

    loop {
        terminal.draw(|frame| app.render(frame))?;

        app.poll_events(tick_rate)?;
        if app.should_quit {
            return Ok(());
        }

        watcher.watch_messages(app.message_dir());
        drain_watcher(app, watcher);
    }
}

/// Apply pending file changes.
fn drain_watcher(app: &mut App, watcher: &FileWatcher) {
    let mut jobs_changed = false;
    let mut changed = Vec::new();

    while let Some(event) = watcher.try_recv_nonblocking() {
        match event {
            WatcherEvent::Changed(path) => {
                if app.jobs_path().is_some_and(|p| same_path(p, &path)) {
                    jobs_changed = true;
                } else if !changed.contains(&path) {
                    changed.push(path);
                }
            }
            WatcherEvent::Error(e) => tracing::warn!("File watcher: {}", e),
        }
    }

    if jobs_changed {
        match app.jobs_path().map(load_job_table) {
            Some(Ok(jobs)) => app.update_jobs(jobs),
            Some(Err(e)) => tracing::warn!("Failed to reload job table: {}", e),
            None => {}
        }
    }
    for path in &changed {
        app.file_changed(path);
    }
}
