//! Logging setup.
//!
//! The TUI owns the terminal, so it logs to a file under the local data
//! directory (`~/.local/share/cardboard/cardboard.log` on Linux). One-shot
//! subcommands log to stderr instead. Both honor `RUST_LOG`.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Guard that must be kept alive for the duration of the program.
/// Dropping it flushes and closes the log file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Directory holding the log file
pub fn log_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|p| p.join("cardboard"))
}

/// Path of the TUI log file
pub fn log_path() -> Option<PathBuf> {
    log_dir().map(|p| p.join("cardboard.log"))
}

fn env_filter(verbose: bool) -> EnvFilter {
    let default = if verbose { "cardboard=debug" } else { "cardboard=info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Log to the cardboard log file. Used while the TUI is running.
pub fn init_file(verbose: bool) -> io::Result<LoggingGuard> {
    let path = log_path()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no local data directory"))?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    let (non_blocking, file_guard) = tracing_appender::non_blocking(file);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    // A subscriber may already be installed (e.g. by tests)
    let _ = tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(file_layer)
        .try_init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Log warnings and errors to stderr. Used by the non-interactive commands.
pub fn init_stderr(verbose: bool) {
    let filter = if verbose {
        env_filter(true)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cardboard=warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
