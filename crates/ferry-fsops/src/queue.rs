//! Shared work queue between the dispatcher and transfer workers.
//!
//! # Design
//! - One mutex guards the item buffer; one condition variable announces new items.
//! - Every mutation and emptiness check happens under the lock.
//! - Consumers re-test emptiness after every wake-up, so a broadcast sent before a
//!   worker started waiting is never lost and spurious wake-ups are harmless.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Condvar, Mutex, MutexGuard};

use tracing::error;

/// Unit of work handed to a transfer worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkItem {
    /// Transfer the whole contents of this directory.
    Directory(PathBuf),
    /// Transfer this single entry.
    File(PathBuf),
    /// No more work for the worker that receives it.
    Stop,
}

#[cfg(test)]
impl WorkItem {
    pub(crate) fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Directory(path) | Self::File(path) => Some(path),
            Self::Stop => None,
        }
    }

    pub(crate) const fn is_stop(&self) -> bool {
        matches!(self, Self::Stop)
    }
}

/// Unbounded FIFO of [`WorkItem`]s with blocking take.
#[derive(Debug, Default)]
pub struct WorkQueue {
    items: Mutex<VecDeque<WorkItem>>,
    available: Condvar,
}

impl WorkQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append items in order and wake every waiting consumer.
    ///
    /// Returns the number of items appended.
    pub fn push_batch(&self, batch: impl IntoIterator<Item = WorkItem>) -> usize {
        let added = {
            let mut items = self.lock_items();
            let before = items.len();
            items.extend(batch);
            items.len() - before
        };
        self.available.notify_all();
        added
    }

    /// Append `count` termination sentinels and wake every waiting consumer.
    pub fn push_stops(&self, count: usize) -> usize {
        self.push_batch(std::iter::repeat_n(WorkItem::Stop, count))
    }

    /// Remove the front item, blocking while the queue is empty.
    pub fn take(&self) -> WorkItem {
        let mut items = self.lock_items();
        loop {
            if let Some(item) = items.pop_front() {
                return item;
            }
            items = match self.available.wait(items) {
                Ok(guard) => guard,
                Err(poisoned) => {
                    error!("work queue mutex poisoned while waiting; continuing with recovered guard");
                    poisoned.into_inner()
                }
            };
        }
    }

    #[cfg(test)]
    pub(crate) fn try_take(&self) -> Option<WorkItem> {
        self.lock_items().pop_front()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.lock_items().len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.lock_items().is_empty()
    }

    fn lock_items(&self) -> MutexGuard<'_, VecDeque<WorkItem>> {
        match self.items.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("work queue mutex poisoned; continuing with recovered guard");
                poisoned.into_inner()
            }
        }
    }
}
