//! Logging infrastructure for the Yoctoprint client.
//!
//! Structured logging using the `tracing` ecosystem: JSON lines to a daily
//! rolling file under `~/.yoctoprint/logs/` and a compact human-readable
//! layer on stderr. `RUST_LOG` overrides the default filter.
//!
//! ## Example
//!
//! ```no_run
//! use yocto_core::logging;
//!
//! let _guard = logging::init_logging(None, false).expect("logging init");
//!
//! tracing::info!("client started");
//! tracing::debug!(host = "octopi.local", "polling status");
//! ```

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Result, YoctoError};

/// Name of the per-user data directory in `$HOME`.
pub const DATA_DIR_NAME: &str = ".yoctoprint";

/// Prefix of the rolling log files inside the log directory.
pub const LOG_FILE_NAME: &str = "yocto.log";

/// Crates whose events are shown at the default level.
const CLIENT_TARGETS: &[&str] = &["yocto", "yocto_core", "yocto_config", "yocto_client"];

/// Guard that must be held to ensure log flushing on shutdown.
///
/// Keep this guard alive for the lifetime of the application.
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Filter directives used when `RUST_LOG` is not set.
///
/// The client crates log at `info` (`debug` when verbose). The HTTP stack
/// underneath is held at `warn` so every status poll does not show up as
/// connection-pool chatter.
pub fn default_filter(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    let mut directives: Vec<String> = CLIENT_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect();
    directives.push("reqwest=warn".to_string());
    directives.push("hyper_util=warn".to_string());
    directives.join(",")
}

/// Initialize the logging system.
///
/// Status polls are written as JSON lines to `yocto.log` (rotated daily) and
/// echoed in compact form on stderr. Source locations are only added to the
/// console output when `verbose` is set.
///
/// # Arguments
///
/// * `log_dir` - Optional custom log directory. Defaults to `~/.yoctoprint/logs/`
/// * `verbose` - Raise the client crates from INFO to DEBUG
///
/// # Returns
///
/// A [`LogGuard`] that must be held for the application lifetime.
pub fn init_logging(log_dir: Option<PathBuf>, verbose: bool) -> Result<LogGuard> {
    let log_dir = match log_dir {
        Some(dir) => dir,
        None => default_log_dir()?,
    };

    std::fs::create_dir_all(&log_dir).map_err(|e| YoctoError::DirectoryCreation {
        path: log_dir.clone(),
        source: e,
    })?;

    let (file_writer, file_guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&log_dir, LOG_FILE_NAME));

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    // Poll ticks are not spans, so only event fields end up in the file
    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .json()
        .flatten_event(true);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_file(verbose)
        .with_line_number(verbose)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    tracing::debug!(log_dir = %log_dir.display(), verbose, "logging initialized");

    Ok(LogGuard {
        _file_guard: Some(file_guard),
    })
}

/// Initialize console-only logging for tests, at the verbose client filter.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(default_filter(true)))
        .with_test_writer()
        .try_init();
}

/// Get the per-user data directory.
///
/// Returns `~/.yoctoprint/`
pub fn data_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| YoctoError::internal("HOME environment variable not set"))?;

    Ok(PathBuf::from(home).join(DATA_DIR_NAME))
}

/// Get the default log directory path.
///
/// Returns `~/.yoctoprint/logs/`
pub fn default_log_dir() -> Result<PathBuf> {
    Ok(data_dir()?.join("logs"))
}
