//! Transfer request model.
//!
//! # Design
//! - `TransferRequest` is immutable once built; callers read it through accessors.
//! - Whole-directory mode always runs a single worker regardless of the requested count.

use std::fmt::{self, Display, Formatter};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::source::SourceSpec;

/// Transfer action applied to every work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Copy items, leaving the source untouched.
    Copy,
    /// Move items, removing them from the source.
    Move,
}

impl Operation {
    /// Stable identifier used in logs and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::Move => "move",
        }
    }
}

impl Display for Operation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "copy" => Ok(Self::Copy),
            "move" => Ok(Self::Move),
            _ => Err(ConfigError::InvalidOperation {
                value: value.to_string(),
            }),
        }
    }
}

/// How the source is split into work items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferMode {
    /// The whole source directory is a single work item.
    WholeDirectory,
    /// Every masked entry of the source directory is its own work item.
    PerFile,
}

impl TransferMode {
    /// Stable identifier used in logs and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WholeDirectory => "whole_directory",
            Self::PerFile => "per_file",
        }
    }
}

/// Immutable description of one transfer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    operation: Operation,
    source_dir: PathBuf,
    destination: PathBuf,
    mask: Option<String>,
    workers: NonZeroUsize,
}

impl TransferRequest {
    /// Build a request from already-validated parts.
    ///
    /// An empty mask is treated as no mask.
    #[must_use]
    pub fn new(
        operation: Operation,
        source_dir: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        mask: Option<String>,
        workers: NonZeroUsize,
    ) -> Self {
        Self {
            operation,
            source_dir: source_dir.into(),
            destination: destination.into(),
            mask: mask.filter(|value| !value.is_empty()),
            workers,
        }
    }

    /// Build a request from a raw source specification such as `inbox/*.csv`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MalformedSource`] when the specification has no
    /// derivable directory and [`ConfigError::InvalidWorkerCount`] when
    /// `workers` is zero.
    pub fn from_source_spec(
        operation: Operation,
        raw_source: &str,
        destination: impl Into<PathBuf>,
        workers: usize,
    ) -> ConfigResult<Self> {
        let workers =
            NonZeroUsize::new(workers).ok_or(ConfigError::InvalidWorkerCount { value: workers })?;
        let SourceSpec { directory, mask } = SourceSpec::parse(raw_source)?;
        Ok(Self::new(operation, directory, destination, mask, workers))
    }

    /// Transfer action applied to each item.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.operation
    }

    /// Directory items are read from.
    #[must_use]
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Directory items are written into.
    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Suffix mask selecting entries in per-file mode.
    #[must_use]
    pub fn mask(&self) -> Option<&str> {
        self.mask.as_deref()
    }

    /// Worker count requested by the caller.
    #[must_use]
    pub const fn requested_workers(&self) -> NonZeroUsize {
        self.workers
    }

    /// Mode implied by the presence of a mask.
    #[must_use]
    pub const fn mode(&self) -> TransferMode {
        if self.mask.is_some() {
            TransferMode::PerFile
        } else {
            TransferMode::WholeDirectory
        }
    }

    /// Number of worker threads the run actually spawns.
    #[must_use]
    pub const fn effective_workers(&self) -> usize {
        match self.mode() {
            TransferMode::WholeDirectory => 1,
            TransferMode::PerFile => self.workers.get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn operation_parses_case_insensitively() -> Result<()> {
        assert_eq!("copy".parse::<Operation>()?, Operation::Copy);
        assert_eq!(" MOVE ".parse::<Operation>()?, Operation::Move);
        assert!(matches!(
            "sync".parse::<Operation>(),
            Err(ConfigError::InvalidOperation { value }) if value == "sync"
        ));
        Ok(())
    }

    #[test]
    fn operation_serializes_as_snake_case() -> Result<()> {
        assert_eq!(serde_json::to_string(&Operation::Move)?, "\"move\"");
        assert_eq!(
            serde_json::to_string(&TransferMode::WholeDirectory)?,
            "\"whole_directory\""
        );
        Ok(())
    }

    #[test]
    fn whole_directory_mode_forces_single_worker() -> Result<()> {
        let request = TransferRequest::from_source_spec(Operation::Copy, "inbox", "out", 8)?;
        assert_eq!(request.mode(), TransferMode::WholeDirectory);
        assert_eq!(request.requested_workers().get(), 8);
        assert_eq!(request.effective_workers(), 1);
        Ok(())
    }

    #[test]
    fn masked_mode_keeps_requested_workers() -> Result<()> {
        let request = TransferRequest::from_source_spec(Operation::Move, "inbox/*.csv", "out", 4)?;
        assert_eq!(request.mode(), TransferMode::PerFile);
        assert_eq!(request.source_dir(), Path::new("inbox"));
        assert_eq!(request.mask(), Some(".csv"));
        assert_eq!(request.effective_workers(), 4);
        Ok(())
    }

    #[test]
    fn zero_workers_are_rejected() {
        assert_eq!(
            TransferRequest::from_source_spec(Operation::Copy, "inbox", "out", 0),
            Err(ConfigError::InvalidWorkerCount { value: 0 })
        );
    }

    #[test]
    fn empty_mask_is_normalised_away() {
        let request = TransferRequest::new(
            Operation::Copy,
            "inbox",
            "out",
            Some(String::new()),
            NonZeroUsize::MIN,
        );
        assert_eq!(request.mode(), TransferMode::WholeDirectory);
    }
}
