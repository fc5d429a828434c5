//! `taskboard`: terminal task board over a REST backend.
//!
//! Configuration via CLI flags, environment variables, or config file
//! (`~/.config/taskboard/config.toml`).
//!
//! ```bash
//! # Against the local development server
//! cargo run --bin taskboard-devserver &
//! cargo run --bin taskboard -- --base-url http://127.0.0.1:8080 --view all
//!
//! # Or via environment variables
//! TASKBOARD_URL=http://tasks.internal/backend cargo run --bin taskboard
//! ```

use std::io;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing_appender::non_blocking::WorkerGuard;

use taskboard::app::App;
use taskboard::board::Board;
use taskboard::config::{CliArgs, ClientConfig};
use taskboard::gateway::http::HttpGateway;
use taskboard::ui;

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            ClientConfig::default()
        }
    };

    // Logs go to a file; ratatui owns stdout.
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    let gateway = match HttpGateway::with_timeout(&config.base_url, config.request_timeout) {
        Ok(g) => Arc::new(g),
        Err(e) => {
            eprintln!("Error: invalid backend url {}: {e}", config.base_url);
            std::process::exit(1);
        }
    };
    tracing::info!(base_url = %config.base_url, view = %config.view, "taskboard starting");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, gateway, &config).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("taskboard exiting");
    result
}

/// Initialize file-based logging.
///
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("taskboard.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Main application loop.
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    gateway: Arc<HttpGateway>,
    config: &ClientConfig,
) -> io::Result<()> {
    let board = Board::new(gateway, config.view, config.debounce);
    let mut app = App::new(board, chrono::Local::now().date_naive());

    // A failed load leaves an alert with a retry; the loop still starts.
    let loaded = app.board.load().await;
    app.finish_intent(loaded);

    loop {
        // The "today" board follows the local calendar across midnight.
        app.set_today(chrono::Local::now().date_naive());

        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Outcomes of debounced saves that finished since the last frame.
        if app.board.process_sync_events().await > 0 {
            app.clamp_cursor();
        }

        if event::poll(config.poll_timeout)?
            && let Event::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            if let Some(intent) = app.handle_key_event(key) {
                tracing::debug!(?intent, "applying intent");
                let result = app.board.apply(intent).await;
                if let Err(e) = &result {
                    tracing::warn!(error = %e, "intent failed");
                }
                app.finish_intent(result);
            }
        }

        if app.should_quit {
            let pending = app.board.pending_edits();
            if pending > 0 {
                tracing::warn!(pending, "quitting with unsent inline edits");
            }
            return Ok(());
        }
    }
}
