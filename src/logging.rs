//! Logging configuration using the tracing ecosystem.
//!
//! Output goes to a daily rolling file so it never corrupts the TUI.
//! `RUST_LOG` overrides the filter; otherwise `--verbose` picks between
//! the quiet and debug defaults.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::config::Profile;

/// Filter used when RUST_LOG is not set.
const DEFAULT_LOG_FILTER: &str = "lazycontacts=info,warn";

/// Filter used with `--verbose` when RUST_LOG is not set.
const VERBOSE_LOG_FILTER: &str = "lazycontacts=debug,reqwest=info,warn";

/// Pick the filter used when RUST_LOG is not set.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    }
}

/// Initialize the logging system.
///
/// Logs are stored in the platform-specific local data directory:
/// - Linux: `~/.local/share/lazycontacts/logs/`
/// - macOS: `~/Library/Application Support/lazycontacts/logs/`
/// - Windows: `C:\Users\<User>\AppData\Local\lazycontacts\logs\`
///
/// # Errors
///
/// Returns an error if the log directory cannot be determined or created,
/// or if a global subscriber is already set.
pub fn init(verbose: bool) -> anyhow::Result<()> {
    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "lazycontacts.log");

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter);

    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "LazyContacts starting up");
    tracing::debug!(log_dir = %log_dir.display(), "Log directory");

    Ok(())
}

/// Record which backend this run talks to.
pub fn log_profile(profile: &Profile, memory_session: bool) {
    let session = if !profile.auth_enabled {
        "none"
    } else if memory_session {
        "memory"
    } else {
        "keyring"
    };
    tracing::info!(
        profile = %profile.name,
        url = %redact_url(&profile.url),
        auth_enabled = profile.auth_enabled,
        error_key = %profile.error_key,
        session,
        "Using profile"
    );
}

/// Drop any `user:password@` part so credentials never reach the log file.
fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let host_end = rest.find('/').unwrap_or(rest.len());
    match rest[..host_end].rfind('@') {
        Some(at) => format!("{}://<redacted>@{}", scheme, &rest[at + 1..]),
        None => url.to_string(),
    }
}

fn get_log_directory() -> anyhow::Result<PathBuf> {
    let base_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;

    Ok(base_dir.join("lazycontacts").join("logs"))
}

/// Get the path where logs are stored.
pub fn log_directory() -> Option<PathBuf> {
    get_log_directory().ok()
}

/// Log application shutdown.
pub fn shutdown() {
    tracing::info!("LazyContacts shutting down");
}
