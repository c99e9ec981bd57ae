//! Consumer side of the work queue.
//!
//! # Design
//! - Each worker runs an explicit `WaitingForWork -> Processing -> WaitingForWork | Terminated`
//!   loop; blocking happens only inside [`WorkQueue::take`].
//! - Per-item failures are recorded and reported through the observer; they never stop
//!   the worker in per-file mode and never reach sibling workers.
//! - A whole-directory item is the only item its worker ever handles.
//! - Every outcome reaches the run ledger before the observer hears about it.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use ferry_config::Operation;
use tracing::{Span, info_span};

use crate::error::FsOpsResult;
use crate::observer::{TransferEvent, TransferObserver};
use crate::queue::{WorkItem, WorkQueue};
use crate::report::{ItemFailure, RunLedger, WorkerSummary};
use crate::transfer::{merge_directory, transfer_entry};

#[derive(Debug)]
enum WorkerState {
    WaitingForWork,
    Processing(WorkItem),
    Terminated,
}

/// One consumer thread's worth of transfer logic.
pub struct TransferWorker {
    id: usize,
    operation: Operation,
    destination: PathBuf,
    queue: Arc<WorkQueue>,
    observer: Arc<dyn TransferObserver>,
    ledger: Arc<RunLedger>,
    throttle: Duration,
    parent: Span,
}

impl TransferWorker {
    /// Worker `id` applying `operation` to items taken from `queue`.
    #[must_use]
    pub fn new(
        id: usize,
        operation: Operation,
        destination: impl Into<PathBuf>,
        queue: Arc<WorkQueue>,
        observer: Arc<dyn TransferObserver>,
    ) -> Self {
        Self {
            id,
            operation,
            destination: destination.into(),
            queue,
            observer,
            ledger: Arc::default(),
            throttle: Duration::ZERO,
            parent: Span::none(),
        }
    }

    /// Pause for `throttle` after every processed item.
    #[must_use]
    pub const fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    /// Nest the worker span under `parent`.
    #[must_use]
    pub fn with_parent_span(mut self, parent: Span) -> Self {
        self.parent = parent;
        self
    }

    #[must_use]
    pub(crate) fn with_ledger(mut self, ledger: Arc<RunLedger>) -> Self {
        self.ledger = ledger;
        self
    }

    /// Drain the queue until a sentinel or a whole-directory item ends the loop.
    pub fn run(self) -> WorkerSummary {
        let span = info_span!(parent: &self.parent, "worker", worker_id = self.id);
        let _entered = span.enter();

        let mut summary = WorkerSummary::new(self.id);
        let mut state = WorkerState::WaitingForWork;
        loop {
            state = match state {
                WorkerState::WaitingForWork => WorkerState::Processing(self.queue.take()),
                WorkerState::Processing(item) => self.process(item, &mut summary),
                WorkerState::Terminated => break,
            };
        }

        self.observer.observe(&TransferEvent::WorkerStopped {
            worker_id: self.id,
            transferred: summary.transferred.len(),
            failed: summary.failures.len(),
        });
        summary
    }

    fn process(&self, item: WorkItem, summary: &mut WorkerSummary) -> WorkerState {
        match item {
            WorkItem::Stop => WorkerState::Terminated,
            WorkItem::Directory(source) => {
                self.ledger.begin(self.id, &source);
                let outcome = merge_directory(self.operation, &source, &self.destination)
                    .map(|()| self.destination.clone());
                self.record(source, outcome, summary);
                self.pace();
                WorkerState::Terminated
            }
            WorkItem::File(source) => {
                self.ledger.begin(self.id, &source);
                let outcome = transfer_entry(self.operation, &source, &self.destination);
                self.record(source, outcome, summary);
                self.pace();
                WorkerState::WaitingForWork
            }
        }
    }

    fn record(&self, source: PathBuf, outcome: FsOpsResult<PathBuf>, summary: &mut WorkerSummary) {
        match outcome {
            Ok(target) => {
                self.ledger.transferred(self.id, source.clone());
                self.observer.observe(&TransferEvent::ItemTransferred {
                    worker_id: self.id,
                    operation: self.operation,
                    source: &source,
                    destination: &target,
                });
                summary.transferred.push(source);
            }
            Err(error) => {
                let failure = ItemFailure {
                    worker_id: self.id,
                    path: source,
                    message: error.detail(),
                };
                self.ledger.failed(failure.clone());
                self.observer.observe(&TransferEvent::ItemFailed {
                    worker_id: self.id,
                    operation: self.operation,
                    source: &failure.path,
                    error: &error,
                });
                summary.failures.push(failure);
            }
        }
    }

    fn pace(&self) {
        if !self.throttle.is_zero() {
            thread::sleep(self.throttle);
        }
    }
}

impl fmt::Debug for TransferWorker {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TransferWorker")
            .field("id", &self.id)
            .field("operation", &self.operation)
            .field("destination", &self.destination)
            .field("throttle", &self.throttle)
            .finish_non_exhaustive()
    }
}
