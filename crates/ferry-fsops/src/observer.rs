//! Lifecycle events emitted during a transfer run.
//!
//! # Design
//! - The run and its workers report through an injected [`TransferObserver`]
//!   instead of reaching for process-wide logging state.
//! - [`TracingObserver`] renders one log line per event.

use std::path::Path;

use ferry_config::{Operation, TransferMode};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::FsOpsError;

/// Event emitted by the transfer service and its workers.
#[derive(Debug)]
pub enum TransferEvent<'a> {
    /// Preconditions passed and workers are about to start.
    RunStarted {
        /// Identifier of the run.
        run_id: Uuid,
        /// Transfer action.
        operation: Operation,
        /// Whole-directory or per-file mode.
        mode: TransferMode,
        /// Source directory.
        source: &'a Path,
        /// Destination directory.
        destination: &'a Path,
        /// Suffix mask in per-file mode.
        mask: Option<&'a str>,
        /// Number of worker threads started.
        workers: usize,
    },
    /// The dispatcher finished filling the queue.
    Dispatched {
        /// Number of real work items enqueued.
        items: usize,
        /// Number of termination sentinels enqueued.
        sentinels: usize,
    },
    /// A worker transferred one item.
    ItemTransferred {
        /// Worker that handled the item.
        worker_id: usize,
        /// Transfer action.
        operation: Operation,
        /// Source path of the item.
        source: &'a Path,
        /// Where the item ended up.
        destination: &'a Path,
    },
    /// A worker failed to transfer one item.
    ItemFailed {
        /// Worker that handled the item.
        worker_id: usize,
        /// Transfer action.
        operation: Operation,
        /// Source path of the item.
        source: &'a Path,
        /// Failure cause.
        error: &'a FsOpsError,
    },
    /// A worker left its loop.
    WorkerStopped {
        /// Worker that stopped.
        worker_id: usize,
        /// Items it transferred.
        transferred: usize,
        /// Items it failed on.
        failed: usize,
    },
    /// All workers have been joined.
    RunFinished {
        /// Identifier of the run.
        run_id: Uuid,
        /// Items transferred across all workers.
        transferred: usize,
        /// Items that failed across all workers.
        failed: usize,
        /// Workers that terminated abnormally.
        crashed_workers: usize,
    },
}

/// Sink for [`TransferEvent`]s, shared by every worker of a run.
pub trait TransferObserver: Send + Sync {
    /// Record one event. Called concurrently from worker threads.
    fn observe(&self, event: &TransferEvent<'_>);
}

/// Observer that writes every event to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl TransferObserver for TracingObserver {
    fn observe(&self, event: &TransferEvent<'_>) {
        match event {
            TransferEvent::RunStarted {
                run_id,
                operation,
                mode,
                source,
                destination,
                mask,
                workers,
            } => info!(
                run_id = %run_id,
                operation = %operation,
                mode = mode.as_str(),
                source = %source.display(),
                destination = %destination.display(),
                mask = mask.unwrap_or(""),
                workers,
                "transfer started"
            ),
            TransferEvent::Dispatched { items, sentinels } => {
                if *items == 0 {
                    warn!(sentinels, "no entries matched the source mask");
                } else {
                    debug!(items, sentinels, "work queue populated");
                }
            }
            TransferEvent::ItemTransferred {
                worker_id,
                operation,
                source,
                destination,
            } => info!(
                worker_id,
                operation = %operation,
                source = %source.display(),
                destination = %destination.display(),
                "item transferred"
            ),
            TransferEvent::ItemFailed {
                worker_id,
                operation,
                source,
                error,
            } => error!(
                worker_id,
                operation = %operation,
                source = %source.display(),
                error = %error.detail(),
                "item transfer failed"
            ),
            TransferEvent::WorkerStopped {
                worker_id,
                transferred,
                failed,
            } => debug!(worker_id, transferred, failed, "worker stopped"),
            TransferEvent::RunFinished {
                run_id,
                transferred,
                failed,
                crashed_workers,
            } => info!(
                run_id = %run_id,
                transferred,
                failed,
                crashed_workers,
                "transfer finished"
            ),
        }
    }
}
