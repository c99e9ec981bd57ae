//! Error types for telemetry operations.

use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

/// Result alias for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Errors raised while installing the logging pipeline.
#[derive(Debug)]
pub enum TelemetryError {
    /// Installing the tracing subscriber failed.
    SubscriberInstall {
        /// Underlying tracing subscriber error.
        source: tracing_subscriber::util::TryInitError,
    },
    /// Creating the directory that holds the log file failed.
    LogDirectory {
        /// Directory path that could not be created.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// The log file path does not end in a file name.
    LogFileName {
        /// Offending log file path.
        path: PathBuf,
    },
    /// Opening the log file failed.
    LogFile {
        /// Log file path that could not be opened.
        path: PathBuf,
        /// Underlying appender error.
        source: tracing_appender::rolling::InitError,
    },
}

impl Display for TelemetryError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::SubscriberInstall { .. } => {
                formatter.write_str("failed to install tracing subscriber")
            }
            Self::LogDirectory { .. } => formatter.write_str("failed to create log directory"),
            Self::LogFileName { .. } => formatter.write_str("log file path has no file name"),
            Self::LogFile { .. } => formatter.write_str("failed to open log file"),
        }
    }
}

impl Error for TelemetryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::SubscriberInstall { source } => Some(source),
            Self::LogDirectory { source, .. } => Some(source),
            Self::LogFile { source, .. } => Some(source),
            Self::LogFileName { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use tracing_subscriber::util::SubscriberInitExt;

    fn try_init_error()
    -> std::result::Result<tracing_subscriber::util::TryInitError, Box<dyn Error>> {
        match tracing_subscriber::registry().try_init() {
            Ok(()) => match tracing_subscriber::registry().try_init() {
                Ok(()) => Err(io::Error::other("expected init error").into()),
                Err(err) => Ok(err),
            },
            Err(err) => Ok(err),
        }
    }

    #[test]
    fn telemetry_error_display_and_source() -> std::result::Result<(), Box<dyn Error>> {
        let cases = vec![
            (
                TelemetryError::SubscriberInstall {
                    source: try_init_error()?,
                },
                "failed to install tracing subscriber",
            ),
            (
                TelemetryError::LogDirectory {
                    path: PathBuf::from("logs"),
                    source: io::Error::other("io"),
                },
                "failed to create log directory",
            ),
        ];

        for (err, message) in cases {
            assert_eq!(err.to_string(), message);
            assert!(err.source().is_some());
        }

        let err = TelemetryError::LogFileName {
            path: PathBuf::from("logs/.."),
        };
        assert_eq!(err.to_string(), "log file path has no file name");
        assert!(err.source().is_none());
        Ok(())
    }
}
