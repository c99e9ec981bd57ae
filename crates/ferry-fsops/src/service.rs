//! Orchestration of one transfer run.
//!
//! # Design
//! - Preconditions (access checks, overlapping directories) are checked before any
//!   thread starts; a failing precondition leaves the filesystem untouched.
//! - Workers start before the dispatcher fills the queue and are always joined.
//! - A panicking worker is counted in the report; its siblings keep draining the queue
//!   and the items it finished before the panic stay in the report.

use std::fmt;
use std::fs;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Utc;
use ferry_config::{DEFAULT_THROTTLE, TransferMode, TransferRequest};
use tracing::{Span, debug, error, info_span};
use uuid::Uuid;

use crate::access;
use crate::dispatch::Dispatcher;
use crate::error::{FsOpsError, FsOpsResult};
use crate::observer::{TransferEvent, TransferObserver};
use crate::queue::WorkQueue;
use crate::report::{RunLedger, TransferReport, WorkerSummary};
use crate::worker::TransferWorker;

/// Runs transfer requests against the local filesystem.
#[derive(Clone)]
pub struct TransferService {
    observer: Arc<dyn TransferObserver>,
    throttle: Duration,
}

impl TransferService {
    /// Service reporting lifecycle events to `observer`.
    #[must_use]
    pub fn new(observer: Arc<dyn TransferObserver>) -> Self {
        Self {
            observer,
            throttle: DEFAULT_THROTTLE,
        }
    }

    /// Override the pause each worker takes after every processed item.
    #[must_use]
    pub const fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    /// Execute `request` to completion and summarise the outcome.
    ///
    /// Per-item failures do not fail the run; they are listed in the report.
    ///
    /// # Errors
    ///
    /// Returns [`FsOpsError::Access`] when a directory precondition fails,
    /// [`FsOpsError::InvalidInput`] when source and destination overlap,
    /// [`FsOpsError::WorkerSpawn`] when a thread cannot be started, and
    /// [`FsOpsError::Io`] when the source cannot be enumerated.
    pub fn run(&self, request: &TransferRequest) -> FsOpsResult<TransferReport> {
        let run_id = Uuid::new_v4();
        let span = info_span!("transfer", run_id = %run_id);
        let _entered = span.enter();

        if let Err(err) = check_preconditions(request) {
            error!(error = %err.detail(), "transfer preconditions failed");
            return Err(err);
        }

        let started_at = Utc::now();
        let workers = request.effective_workers();
        self.observer.observe(&TransferEvent::RunStarted {
            run_id,
            operation: request.operation(),
            mode: request.mode(),
            source: request.source_dir(),
            destination: request.destination(),
            mask: request.mask(),
            workers,
        });

        let queue = Arc::new(WorkQueue::new());
        let ledger = Arc::new(RunLedger::default());
        let handles = self.spawn_workers(request, &queue, &ledger, workers, &span)?;

        let dispatcher = Dispatcher::new(request.source_dir(), request.mask(), workers);
        let summary = match dispatcher.dispatch(&queue) {
            Ok(summary) => summary,
            Err(err) => {
                error!(error = %err.detail(), "source enumeration failed");
                join_workers(handles);
                return Err(err);
            }
        };
        self.observer.observe(&TransferEvent::Dispatched {
            items: summary.items,
            sentinels: summary.sentinels,
        });

        let crashed_workers = join_workers(handles);
        let (transferred, failures) = ledger.finish();
        self.observer.observe(&TransferEvent::RunFinished {
            run_id,
            transferred: transferred.len(),
            failed: failures.len(),
            crashed_workers,
        });

        Ok(TransferReport {
            run_id,
            operation: request.operation(),
            mode: request.mode(),
            source: request.source_dir().to_path_buf(),
            destination: request.destination().to_path_buf(),
            mask: request.mask().map(str::to_string),
            workers,
            items_enqueued: summary.items,
            sentinels_enqueued: summary.sentinels,
            transferred,
            failures,
            crashed_workers,
            started_at,
            finished_at: Utc::now(),
        })
    }

    fn spawn_workers(
        &self,
        request: &TransferRequest,
        queue: &Arc<WorkQueue>,
        ledger: &Arc<RunLedger>,
        workers: usize,
        span: &Span,
    ) -> FsOpsResult<Vec<JoinHandle<WorkerSummary>>> {
        let mut handles = Vec::with_capacity(workers);
        for worker_id in 1..=workers {
            let worker = TransferWorker::new(
                worker_id,
                request.operation(),
                request.destination(),
                Arc::clone(queue),
                Arc::clone(&self.observer),
            )
            .with_throttle(self.throttle)
            .with_ledger(Arc::clone(ledger))
            .with_parent_span(span.clone());

            let spawned = thread::Builder::new()
                .name(format!("ferry-worker-{worker_id}"))
                .spawn(move || worker.run());
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(source) => {
                    queue.push_stops(handles.len());
                    join_workers(handles);
                    let err = FsOpsError::WorkerSpawn { worker_id, source };
                    error!(error = %err.detail(), "transfer worker failed to start");
                    return Err(err);
                }
            }
        }
        Ok(handles)
    }
}

impl fmt::Debug for TransferService {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TransferService")
            .field("throttle", &self.throttle)
            .finish_non_exhaustive()
    }
}

fn check_preconditions(request: &TransferRequest) -> FsOpsResult<()> {
    access::validate(request.source_dir(), request.destination())?;

    let source = canonical(request.source_dir())?;
    let destination = canonical(request.destination())?;
    let overlap = match (request.mode(), request.mask()) {
        (TransferMode::PerFile, _) if destination == source => Some("same_as_source"),
        (TransferMode::PerFile, Some(mask)) => first_component_below(&destination, &source)
            .filter(|name| name.to_string_lossy().ends_with(mask))
            .map(|_| "inside_matched_entry"),
        (TransferMode::PerFile, None) => None,
        (TransferMode::WholeDirectory, _) => {
            destination.starts_with(&source).then_some("inside_source")
        }
    };
    match overlap {
        Some(reason) => Err(FsOpsError::InvalidInput {
            field: "destination",
            reason,
            value: Some(request.destination().to_string_lossy().into_owned()),
        }),
        None => Ok(()),
    }
}

fn canonical(path: &Path) -> FsOpsResult<PathBuf> {
    fs::canonicalize(path).map_err(|source| FsOpsError::io("service.canonicalize", path, source))
}

/// Name of the entry directly under `source` that contains `destination`.
fn first_component_below<'a>(destination: &'a Path, source: &Path) -> Option<&'a OsStr> {
    match destination.strip_prefix(source).ok()?.components().next()? {
        Component::Normal(name) => Some(name),
        _ => None,
    }
}

/// Join every worker and return how many terminated abnormally.
fn join_workers(handles: Vec<JoinHandle<WorkerSummary>>) -> usize {
    let mut crashed = 0;
    for handle in handles {
        let name = handle.thread().name().unwrap_or("ferry-worker").to_string();
        match handle.join() {
            Ok(summary) => debug!(
                worker = %name,
                transferred = summary.transferred.len(),
                failed = summary.failures.len(),
                "transfer worker joined"
            ),
            Err(_) => {
                error!(worker = %name, "transfer worker terminated abnormally");
                crashed += 1;
            }
        }
    }
    crashed
}
