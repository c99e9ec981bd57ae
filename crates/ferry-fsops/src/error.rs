//! # Design
//!
//! - Provide structured, constant-message errors for the transfer pipeline.
//! - Capture operation context (paths, roles, capabilities) to make failures reproducible in tests.
//! - Preserve source errors without interpolating context into error messages.

use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Result type for transfer operations.
pub type FsOpsResult<T> = Result<T, FsOpsError>;

/// Which side of the transfer a directory check applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectoryRole {
    /// Directory items are read from.
    Source,
    /// Directory items are written into.
    Destination,
}

impl DirectoryRole {
    /// Stable identifier used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Destination => "destination",
        }
    }
}

impl Display for DirectoryRole {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Capability probed on a directory before a run starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// The path exists.
    Exists,
    /// The path is a directory.
    Directory,
    /// The directory can be listed and its entries read.
    Read,
    /// Entries can be created in the directory.
    Write,
}

impl Capability {
    /// Stable identifier used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exists => "exists",
            Self::Directory => "directory",
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

impl Display for Capability {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Errors produced by the transfer pipeline.
#[derive(Debug, Error)]
pub enum FsOpsError {
    /// A source or destination directory failed its precondition check.
    #[error("directory access check failed")]
    Access {
        /// Side of the transfer that failed.
        role: DirectoryRole,
        /// Capability that was missing.
        capability: Capability,
        /// Directory that was probed.
        path: PathBuf,
        /// Underlying OS error.
        source: io::Error,
    },
    /// IO failures while interacting with the filesystem.
    #[error("fsops io failure")]
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Walkdir traversal failures.
    #[error("fsops walkdir failure")]
    Walkdir {
        /// Operation that triggered the walkdir failure.
        operation: &'static str,
        /// Path involved in the walkdir failure.
        path: PathBuf,
        /// Underlying walkdir error.
        source: walkdir::Error,
    },
    /// Input validation failures.
    #[error("fsops invalid input")]
    InvalidInput {
        /// Field that failed validation.
        field: &'static str,
        /// Static reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// A worker thread could not be started.
    #[error("failed to spawn transfer worker")]
    WorkerSpawn {
        /// Identifier of the worker that failed to start.
        worker_id: usize,
        /// Underlying IO error.
        source: io::Error,
    },
}

impl FsOpsError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn walkdir(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: walkdir::Error,
    ) -> Self {
        Self::Walkdir {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Render the error and its source chain on one line, for logs and reports.
    #[must_use]
    pub fn detail(&self) -> String {
        let mut detail = match self {
            Self::Access {
                role,
                capability,
                path,
                ..
            } => format!("{self} ({role} {capability} {})", path.display()),
            Self::Io {
                operation, path, ..
            }
            | Self::Walkdir {
                operation, path, ..
            } => format!("{self} ({operation} {})", path.display()),
            Self::InvalidInput {
                field,
                reason,
                value,
            } => match value {
                Some(value) => format!("{self} ({field} {reason}: {value})"),
                None => format!("{self} ({field} {reason})"),
            },
            Self::WorkerSpawn { worker_id, .. } => format!("{self} (worker {worker_id})"),
        };

        let mut source = self.source();
        while let Some(cause) = source {
            detail.push_str(": ");
            detail.push_str(&cause.to_string());
            source = cause.source();
        }
        detail
    }
}
