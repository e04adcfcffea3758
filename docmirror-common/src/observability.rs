//! Shared observability helpers for binaries and integration tests.
//!
//! The logging initializer centralises our `tracing` setup so that the
//! mirror binary and the test suites emit through the same layers. Call
//! [`init_logging`] once near process start; additional callers are treated
//! as no-ops and simply receive the originally resolved log file path.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use chrono::Local;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static LOG_PATH: OnceLock<Option<PathBuf>> = OnceLock::new();

const LOG_DIR_ENV: &str = "DOCMIRROR_LOG_DIR";

/// Output encoding for structured logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Configuration passed to [`init_logging`].
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Logical name of the component (used for defaults and file names).
    pub app_name: &'static str,
    /// Whether to write a daily rolling log file at all.
    pub write_file: bool,
    /// Optional explicit directory for log output. If `None`, we consult
    /// `DOCMIRROR_LOG_DIR` and finally fall back to the platform data dir.
    pub log_dir: Option<PathBuf>,
    /// Whether to emit events to `stderr` (the console progress stream).
    pub emit_stderr: bool,
    /// Preferred log encoding.
    pub format: LogFormat,
    /// Default filter applied when `RUST_LOG` is unset.
    pub default_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "docmirror",
            write_file: false,
            log_dir: None,
            emit_stderr: true,
            format: LogFormat::Text,
            default_filter: "info".to_string(),
        }
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Returns the concrete log file path for the current day when a file sink
/// was requested. Subsequent calls are cheap and hand back the first result.
pub fn init_logging(config: LogConfig) -> anyhow::Result<Option<PathBuf>> {
    if let Some(path) = LOG_PATH.get() {
        return Ok(path.clone());
    }

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let mut full_path = None;
    let file_layer = if config.write_file {
        let resolved_dir = resolve_log_dir(config.app_name, config.log_dir.as_deref());
        std::fs::create_dir_all(&resolved_dir).with_context(|| {
            format!("failed to create log directory: {}", resolved_dir.display())
        })?;

        let log_filename = format!("{}.log", config.app_name);
        let today = Local::now().format("%Y-%m-%d").to_string();
        full_path = Some(resolved_dir.join(format!("{log_filename}.{today}")));

        let appender = rolling::daily(resolved_dir, log_filename);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);

        Some(match config.format {
            LogFormat::Text => fmt::layer().with_writer(writer).with_ansi(false).boxed(),
            LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
        })
    } else {
        None
    };

    let stderr_layer = config.emit_stderr.then(|| match config.format {
        LogFormat::Text => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(std::io::stderr).boxed(),
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;

    let _ = LOG_PATH.set(full_path.clone());
    Ok(full_path)
}

fn resolve_log_dir(app_name: &str, explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return expand_home(dir);
    }

    if let Ok(env_dir) = std::env::var(LOG_DIR_ENV) {
        return expand_home(Path::new(&env_dir));
    }

    default_data_dir(app_name)
}

fn expand_home(path: &Path) -> PathBuf {
    if let Some(rest) = path.to_str().and_then(|s| s.strip_prefix("~/")) {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

fn default_data_dir(app_name: &str) -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(app_name))
        .unwrap_or_else(|| PathBuf::from(".").join(app_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_dir_wins() {
        let dir = resolve_log_dir("docmirror", Some(Path::new("/tmp/mirror-logs")));
        assert_eq!(dir, PathBuf::from("/tmp/mirror-logs"));
    }

    #[test]
    fn default_dir_ends_with_app_name() {
        assert!(default_data_dir("docmirror").ends_with("docmirror"));
    }

    #[test]
    fn plain_paths_are_not_expanded() {
        assert_eq!(expand_home(Path::new("logs")), PathBuf::from("logs"));
    }
}
