//! ghpeek - preview a GitHub profile card in the terminal
//!
//! Opens a profile card for one user, served from a short-lived local cache
//! when possible and fetched from the GitHub API otherwise.

use std::fs::{self, OpenOptions};
use std::io::{self, Stdout};
use std::panic;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use ghpeek::app::{App, AppState};
use ghpeek::cache::FileBackend;
use ghpeek::cli::{Cli, StartupConfig};
use ghpeek::error::{Error, Result};
use ghpeek::resource::FetchOutcome;
use ghpeek::ui;

const LOG_FILE: &str = "ghpeek.log";

/// Sets up a panic hook that restores the terminal before printing the panic message.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

/// Initializes env_logger when `--debug` is set
///
/// With `--print` logs go to stderr. The terminal UI owns the screen, so
/// otherwise they are appended to `ghpeek.log` in the cache directory.
fn init_logging(config: &StartupConfig) -> Result<()> {
    if !config.debug {
        return Ok(());
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("ghpeek=debug"));

    if !config.print {
        let dir = match &config.cache_dir {
            Some(dir) => dir.clone(),
            None => FileBackend::new()
                .ok_or(Error::NoCacheDir)?
                .cache_dir()
                .to_path_buf(),
        };
        fs::create_dir_all(&dir)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(LOG_FILE))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}

/// Renders the UI based on the current application state
fn render_ui(frame: &mut ratatui::Frame, app: &App) {
    ui::render_home(frame, app.username());

    if app.state == AppState::Card {
        if let Some(outcome) = app.outcome() {
            ui::render_card(frame, outcome);
        }
    }

    if app.show_help {
        ui::render_help_overlay(frame);
    }
}

/// Loads the card once and prints it; fails unless the profile loaded
async fn run_print(mut app: App) -> Result<ExitCode> {
    app.open_card();
    app.settle().await;

    let outcome = app.outcome().cloned().unwrap_or(FetchOutcome::Loading);
    println!("{}", ui::card::plain_text(&ui::card_view(&outcome)));

    Ok(match outcome {
        FetchOutcome::Success { .. } => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

fn event_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        // Pick up a finished fetch before drawing
        app.tick();

        terminal.draw(|f| render_ui(f, app))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn run_tui(mut app: App) -> Result<ExitCode> {
    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.open_card();
    let result = event_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result.map(|()| ExitCode::SUCCESS)
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = StartupConfig::from_cli(&cli)?;
    init_logging(&config)?;

    let app = App::new(&config)?;
    if config.clear_cache {
        app.clear_cache();
    }
    log::debug!(
        "Starting for {} (ttl {}s)",
        config.username,
        config.ttl.as_secs()
    );

    if config.print {
        run_print(app).await
    } else {
        run_tui(app)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
