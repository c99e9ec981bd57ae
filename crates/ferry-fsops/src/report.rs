//! Run summaries returned to the caller.
//!
//! Workers write each outcome into a shared [`RunLedger`] as soon as it is known,
//! so the report survives a worker that panics part-way through its queue.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use ferry_config::{Operation, TransferMode};
use serde::Serialize;
use tracing::error;
use uuid::Uuid;

const ABANDONED_ITEM: &str = "worker terminated abnormally while processing this item";

/// One item a worker could not transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    /// Worker that handled the item.
    pub worker_id: usize,
    /// Source path of the item.
    pub path: PathBuf,
    /// Error detail, including its source chain.
    pub message: String,
}

/// What a single worker did before it stopped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerSummary {
    /// Worker identifier.
    pub worker_id: usize,
    /// Source paths transferred successfully.
    pub transferred: Vec<PathBuf>,
    /// Items that failed.
    pub failures: Vec<ItemFailure>,
}

impl WorkerSummary {
    pub(crate) fn new(worker_id: usize) -> Self {
        Self {
            worker_id,
            ..Self::default()
        }
    }
}

/// Run-wide record of item outcomes shared by every worker of one run.
#[derive(Debug, Default)]
pub(crate) struct RunLedger {
    state: Mutex<LedgerState>,
}

#[derive(Debug, Default)]
struct LedgerState {
    transferred: Vec<PathBuf>,
    failures: Vec<ItemFailure>,
    in_flight: BTreeMap<usize, PathBuf>,
}

impl RunLedger {
    /// Mark `path` as the item `worker_id` is working on.
    pub(crate) fn begin(&self, worker_id: usize, path: &Path) {
        self.lock_state().in_flight.insert(worker_id, path.to_path_buf());
    }

    pub(crate) fn transferred(&self, worker_id: usize, path: PathBuf) {
        let mut state = self.lock_state();
        state.in_flight.remove(&worker_id);
        state.transferred.push(path);
    }

    pub(crate) fn failed(&self, failure: ItemFailure) {
        let mut state = self.lock_state();
        state.in_flight.remove(&failure.worker_id);
        state.failures.push(failure);
    }

    /// Sorted transferred paths and failures; items still in flight count as failed.
    pub(crate) fn finish(&self) -> (Vec<PathBuf>, Vec<ItemFailure>) {
        let mut state = self.lock_state();
        let abandoned = std::mem::take(&mut state.in_flight);
        let mut transferred = std::mem::take(&mut state.transferred);
        let mut failures = std::mem::take(&mut state.failures);
        failures.extend(abandoned.into_iter().map(|(worker_id, path)| ItemFailure {
            worker_id,
            path,
            message: ABANDONED_ITEM.to_string(),
        }));
        transferred.sort();
        failures.sort_by(|left, right| left.path.cmp(&right.path));
        (transferred, failures)
    }

    fn lock_state(&self) -> MutexGuard<'_, LedgerState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("run ledger mutex poisoned; continuing with recovered guard");
                poisoned.into_inner()
            }
        }
    }
}

/// Outcome of one transfer run.
#[derive(Debug, Clone, Serialize)]
pub struct TransferReport {
    /// Identifier of the run, also recorded on its log span.
    pub run_id: Uuid,
    /// Transfer action.
    pub operation: Operation,
    /// Whole-directory or per-file mode.
    pub mode: TransferMode,
    /// Source directory.
    pub source: PathBuf,
    /// Destination directory.
    pub destination: PathBuf,
    /// Suffix mask in per-file mode.
    pub mask: Option<String>,
    /// Worker threads started.
    pub workers: usize,
    /// Real work items enqueued.
    pub items_enqueued: usize,
    /// Termination sentinels enqueued.
    pub sentinels_enqueued: usize,
    /// Source paths transferred successfully.
    pub transferred: Vec<PathBuf>,
    /// Items that failed.
    pub failures: Vec<ItemFailure>,
    /// Workers that terminated abnormally.
    pub crashed_workers: usize,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the last worker was joined.
    pub finished_at: DateTime<Utc>,
}

impl TransferReport {
    /// Number of items transferred successfully.
    #[must_use]
    pub const fn succeeded(&self) -> usize {
        self.transferred.len()
    }

    /// Number of items that failed.
    #[must_use]
    pub const fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Whether every enqueued item was transferred and no worker crashed.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.failures.is_empty()
            && self.crashed_workers == 0
            && self.transferred.len() == self.items_enqueued
    }
}
