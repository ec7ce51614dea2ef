//! LazyContacts - A terminal-based client for a contacts REST API
//!
//! Lists, creates, edits and deletes contacts on a remote backend, with
//! optional token-based login.

mod api;
mod app;
mod config;
mod error;
mod events;
mod logging;
mod tasks;
mod ui;

use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::warn;

use crate::api::{
    ContactsClient, ErrorKey, KeyringSessionStore, MemorySessionStore, SharedSession,
};
use crate::app::App;
use crate::config::{Config, Profile};
use crate::error::{AppError, Result};
use crate::events::EventHandler;
use crate::tasks::{create_task_channel, ApiMessage, TaskSpawner};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "lazycontacts", version, about)]
struct Cli {
    /// Configuration file to use instead of the default location.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Profile to connect with.
    #[arg(long, value_name = "NAME")]
    profile: Option<String>,

    /// Backend base URL, overriding the profile's.
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Talk to the older backend: no login, errors under `message`.
    #[arg(long)]
    legacy: bool,

    /// JSON field that carries error messages.
    #[arg(long, value_name = "KEY")]
    error_key: Option<ErrorKey>,

    /// Keep tokens in memory only instead of the OS keyring.
    #[arg(long)]
    memory_session: bool,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long)]
    verbose: bool,
}

type Tui = Terminal<CrosstermBackend<Stdout>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("Warning: failed to initialize logging: {}", e);
    }

    let result = run(cli).await;
    logging::shutdown();

    if let Err(e) = &result {
        tracing::error!(error = %e, "Exiting with error");
        eprintln!("Error: {}", e.user_message());
        if let Some(action) = e.suggested_action() {
            eprintln!("{}", action);
        }
        if let Some(dir) = logging::log_directory() {
            eprintln!("Logs: {}", dir.display());
        }
    }
    result.context("lazycontacts failed")
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let profile = resolve_profile(&cli, &config)?;
    logging::log_profile(&profile, cli.memory_session);

    let session = open_session(&profile, cli.memory_session);
    let client = ContactsClient::new(
        &profile,
        session.clone(),
        config.settings.request_timeout(),
    )?;
    let (rx, spawner) = create_task_channel(client);
    let app = App::new(session, profile.auth_enabled, profile.name.as_str());

    let mut terminal = setup_terminal()?;
    let result = run_loop(&mut terminal, app, rx, spawner);
    restore_terminal(&mut terminal);
    result
}

/// Pick the profile and apply command-line overrides.
fn resolve_profile(cli: &Cli, config: &Config) -> Result<Profile> {
    let mut profile = match &cli.profile {
        Some(name) => config.get_profile(name)?.clone(),
        None => config
            .get_default_profile()
            .cloned()
            .unwrap_or_else(Profile::local),
    };

    if let Some(url) = &cli.url {
        profile.url = url.clone();
    }
    if cli.legacy {
        let options = api::ClientOptions::legacy();
        profile.auth_enabled = options.auth_enabled;
        profile.error_key = options.error_key;
    }
    if let Some(key) = cli.error_key {
        profile.error_key = key;
    }

    profile.validate()?;
    Ok(profile)
}

/// Open the token store for a profile.
///
/// Falls back to memory when the keyring is not wanted or not needed.
fn open_session(profile: &Profile, memory_only: bool) -> SharedSession {
    if memory_only || !profile.auth_enabled {
        Arc::new(MemorySessionStore::new())
    } else {
        Arc::new(KeyringSessionStore::new(profile.name.as_str()))
    }
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode().map_err(|e| AppError::terminal(format!("enable raw mode: {}", e)))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)
        .map_err(|e| AppError::terminal(format!("enter alternate screen: {}", e)))?;
    Terminal::new(CrosstermBackend::new(stdout))
        .map_err(|e| AppError::terminal(format!("create terminal: {}", e)))
}

fn restore_terminal(terminal: &mut Tui) {
    if let Err(e) = disable_raw_mode() {
        warn!(error = %e, "Failed to disable raw mode");
    }
    if let Err(e) = execute!(terminal.backend_mut(), LeaveAlternateScreen) {
        warn!(error = %e, "Failed to leave alternate screen");
    }
    terminal.show_cursor().ok();
}

/// Draw, apply finished API calls, then wait one tick for input.
fn run_loop(
    terminal: &mut Tui,
    mut app: App,
    mut rx: UnboundedReceiver<ApiMessage>,
    spawner: TaskSpawner,
) -> Result<()> {
    let events = EventHandler::new();

    if let Some(request) = app.startup_command() {
        spawner.dispatch(request);
    }

    while !app.should_quit() {
        terminal.draw(|frame| app.view(frame))?;

        while let Ok(message) = rx.try_recv() {
            if let Some(request) = app.handle_api_message(message) {
                spawner.dispatch(request);
            }
        }

        if let Some(request) = app.update(events.next()?) {
            spawner.dispatch(request);
        }
    }

    Ok(())
}
