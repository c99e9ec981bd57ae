#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! Bulk copy and move of directory contents across a pool of worker threads.
//!
//! Layout: `access.rs` (directory preconditions), `queue.rs` (shared work queue),
//! `dispatch.rs` (producer), `worker.rs` (consumers), `transfer.rs` (copy/move
//! primitives), `observer.rs` (lifecycle events), `report.rs` (run summaries),
//! `service.rs` (orchestration), `error.rs` (`FsOpsError`).

pub mod access;
pub mod dispatch;
pub mod error;
pub mod observer;
pub mod queue;
pub mod report;
pub mod service;
pub mod transfer;
pub mod worker;

pub use dispatch::{DispatchSummary, Dispatcher};
pub use error::{Capability, DirectoryRole, FsOpsError, FsOpsResult};
pub use observer::{TracingObserver, TransferEvent, TransferObserver};
pub use queue::{WorkItem, WorkQueue};
pub use report::{ItemFailure, TransferReport, WorkerSummary};
pub use service::TransferService;
pub use worker::TransferWorker;
