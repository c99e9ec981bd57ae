//! Logging initialisation.
//!
//! # Design
//! - Single entry point that installs one subscriber for the whole process.
//! - Every event goes to stderr and to a fixed, never-rotated log file.
//! - `RUST_LOG` wins over the configured level.

use std::fs;
use std::io;
use std::path::Path;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::error::{Result, TelemetryError};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig<'a> {
    /// Log level string or filter directive (e.g., `info`, `ferry_fsops=debug`).
    pub level: &'a str,
    /// Output format selection for both sinks.
    pub format: LogFormat,
    /// File that receives a copy of every log line.
    pub file: &'a Path,
}

/// Available output formats for the logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Emit logs as structured JSON objects.
    Json,
    /// Emit human-readable log lines.
    Pretty,
}

impl LogFormat {
    /// Choose a sensible default for the current build.
    #[must_use]
    pub const fn infer() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }

    /// Resolve a format name, falling back to [`LogFormat::infer`] for unknown or missing names.
    #[must_use]
    pub fn from_name(name: Option<&str>) -> Self {
        match name.map(str::trim) {
            Some("json") => Self::Json,
            Some("pretty") => Self::Pretty,
            _ => Self::infer(),
        }
    }
}

/// Configure and install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if the log file path has no file name, the log file cannot
/// be opened, or another subscriber has already been installed.
pub fn init_logging(config: &LoggingConfig<'_>) -> Result<()> {
    let appender = open_log_file(config.file)?;

    tracing_subscriber::registry()
        .with(build_layers(config.format, appender))
        .with(build_env_filter(config.level))
        .try_init()
        .map_err(|source| TelemetryError::SubscriberInstall { source })
}

fn open_log_file(file: &Path) -> Result<RollingFileAppender> {
    let file_name = file
        .file_name()
        .ok_or_else(|| TelemetryError::LogFileName {
            path: file.to_path_buf(),
        })?
        .to_string_lossy()
        .into_owned();
    let directory = match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(directory).map_err(|source| TelemetryError::LogDirectory {
        path: directory.to_path_buf(),
        source,
    })?;

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(directory)
        .map_err(|source| TelemetryError::LogFile {
            path: file.to_path_buf(),
            source,
        })
}

fn build_layers(format: LogFormat, appender: RollingFileAppender) -> Vec<BoxedLayer> {
    match format {
        LogFormat::Json => vec![
            fmt::layer()
                .json()
                .with_target(false)
                .with_thread_ids(false)
                .with_writer(io::stderr)
                .boxed(),
            fmt::layer()
                .json()
                .with_target(false)
                .with_thread_ids(false)
                .with_ansi(false)
                .with_writer(appender)
                .boxed(),
        ],
        LogFormat::Pretty => vec![
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_writer(io::stderr)
                .boxed(),
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_ansi(false)
                .with_writer(appender)
                .boxed(),
        ],
    }
}

fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn log_format_from_name_parses_variants() {
        assert_eq!(LogFormat::from_name(Some("json")), LogFormat::Json);
        assert_eq!(LogFormat::from_name(Some(" pretty ")), LogFormat::Pretty);
        assert_eq!(LogFormat::from_name(Some("xml")), LogFormat::infer());
        assert_eq!(LogFormat::from_name(None), LogFormat::infer());
    }

    #[test]
    fn open_log_file_creates_missing_directories() -> std::result::Result<(), Box<dyn Error>> {
        let temp = tempfile::tempdir()?;
        let file = temp.path().join("nested").join("logs").join("run.log");
        let _appender = open_log_file(&file)?;
        assert!(file.parent().is_some_and(Path::is_dir));
        Ok(())
    }

    #[test]
    fn log_path_without_file_name_is_rejected() {
        assert!(matches!(
            open_log_file(Path::new("logs/..")),
            Err(TelemetryError::LogFileName { .. })
        ));
    }

    #[test]
    fn init_logging_installs_subscriber_once() -> std::result::Result<(), Box<dyn Error>> {
        let temp = tempfile::tempdir()?;
        let file = temp.path().join("ferry.log");
        let config = LoggingConfig {
            level: "info",
            format: LogFormat::Pretty,
            file: &file,
        };
        let first = init_logging(&config);
        let second = init_logging(&config);
        assert!(matches!(
            second,
            Err(TelemetryError::SubscriberInstall { .. })
        ));
        if first.is_ok() {
            assert!(file.is_file());
        }
        Ok(())
    }
}
