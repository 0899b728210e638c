//! Logging setup.
//!
//! Console output (stderr) always; a log file as well when `[logging] file`
//! is set. `RUST_LOG` overrides the configured level.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{ConfigError, LoggingConfig};

/// Keeps the file writer flushing. Hold it until the process exits.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber.
///
/// # Errors
///
/// [`ConfigError::Logging`] when the level is not a valid filter, the log
/// file cannot be created or a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, ConfigError> {
    let filter = build_filter(&config.level)?;

    let console = fmt::layer()
        .with_timer(LocalTime::rfc_3339())
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match &config.file {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(open_log_file(path)?);
            let layer = fmt::layer()
                .with_timer(LocalTime::rfc_3339())
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| ConfigError::Logging(e.to_string()))?;

    Ok(LoggingGuard { _file: guard })
}

fn build_filter(level: &str) -> Result<EnvFilter, ConfigError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| ConfigError::Logging(format!("invalid level '{}': {}", level, e))),
    }
}

fn open_log_file(path: &Path) -> Result<std::fs::File, ConfigError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| ConfigError::Logging(format!("{}: {}", parent.display(), e)))?;
    }

    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| ConfigError::Logging(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_build_filter_accepts_levels() {
        for level in ["trace", "debug", "info", "warn", "error", "landmask=debug"] {
            assert!(build_filter(level).is_ok(), "level {}", level);
        }
    }

    #[test]
    fn test_open_log_file_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs").join("landmask.log");
        open_log_file(&path).unwrap();
        assert!(path.exists());
    }
}
