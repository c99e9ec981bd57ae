//! Producer side of the work queue.
//!
//! # Design
//! - Whole-directory mode enqueues a single item and no sentinels; its lone worker
//!   terminates after that item.
//! - Per-file mode lists direct entries only and appends one sentinel per worker
//!   after the real items, so every worker observes exactly one termination signal.
//! - Sentinels are enqueued even when enumeration fails, so started workers never hang.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{FsOpsError, FsOpsResult};
use crate::queue::{WorkItem, WorkQueue};

/// Counts of what the dispatcher placed on the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Real work items enqueued.
    pub items: usize,
    /// Termination sentinels enqueued.
    pub sentinels: usize,
}

/// Single producer that fills a [`WorkQueue`] for one run.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    source_dir: PathBuf,
    mask: Option<String>,
    workers: usize,
}

impl Dispatcher {
    /// Dispatcher for `source_dir`; `workers` sentinels follow the items in per-file mode.
    #[must_use]
    pub fn new(source_dir: impl Into<PathBuf>, mask: Option<&str>, workers: usize) -> Self {
        Self {
            source_dir: source_dir.into(),
            mask: mask.filter(|value| !value.is_empty()).map(str::to_string),
            workers,
        }
    }

    /// Work items for the source, without sentinels.
    ///
    /// # Errors
    ///
    /// Returns [`FsOpsError::Io`] when the source directory cannot be listed.
    pub fn enumerate(&self) -> FsOpsResult<Vec<WorkItem>> {
        match &self.mask {
            None => Ok(vec![WorkItem::Directory(self.source_dir.clone())]),
            Some(mask) => matching_entries(&self.source_dir, mask)
                .map(|paths| paths.into_iter().map(WorkItem::File).collect()),
        }
    }

    /// Enumerate the source and push every item, then the sentinels, onto `queue`.
    ///
    /// # Errors
    ///
    /// Returns the enumeration failure after the sentinels have been enqueued.
    pub fn dispatch(&self, queue: &WorkQueue) -> FsOpsResult<DispatchSummary> {
        let items = match self.enumerate() {
            Ok(items) => items,
            Err(err) => {
                queue.push_stops(self.sentinel_count());
                return Err(err);
            }
        };

        let items = queue.push_batch(items);
        let sentinels = queue.push_stops(self.sentinel_count());
        debug!(
            source = %self.source_dir.display(),
            items,
            sentinels,
            "dispatch complete"
        );
        Ok(DispatchSummary { items, sentinels })
    }

    const fn sentinel_count(&self) -> usize {
        if self.mask.is_some() { self.workers } else { 0 }
    }
}

fn matching_entries(source_dir: &Path, mask: &str) -> FsOpsResult<Vec<PathBuf>> {
    let entries = fs::read_dir(source_dir)
        .map_err(|source| FsOpsError::io("dispatch.read_dir", source_dir, source))?;

    let mut matched = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|source| FsOpsError::io("dispatch.read_entry", source_dir, source))?;
        if entry.file_name().to_string_lossy().ends_with(mask) {
            matched.push(entry.path());
        }
    }
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use ferry_test_support::fixtures::{temp_dir, write_files};
    use std::collections::BTreeSet;

    fn drain(queue: &WorkQueue) -> Vec<WorkItem> {
        std::iter::from_fn(|| queue.try_take()).collect()
    }

    #[test]
    fn whole_directory_mode_enqueues_one_item_and_no_sentinels() -> Result<()> {
        let temp = temp_dir()?;
        write_files(temp.path(), &[("a.txt", "a"), ("nested/b.txt", "b")])?;
        let queue = WorkQueue::new();

        let summary = Dispatcher::new(temp.path(), None, 4).dispatch(&queue)?;
        assert_eq!(summary, DispatchSummary { items: 1, sentinels: 0 });
        assert_eq!(
            drain(&queue),
            vec![WorkItem::Directory(temp.path().to_path_buf())]
        );
        Ok(())
    }

    #[test]
    fn masked_mode_matches_direct_entries_by_suffix() -> Result<()> {
        let temp = temp_dir()?;
        write_files(
            temp.path(),
            &[
                ("a.txt", "a"),
                ("b.txt", "b"),
                ("c.csv", "c"),
                ("notes.txt.bak", "d"),
                ("nested/deep.txt", "e"),
            ],
        )?;
        let queue = WorkQueue::new();

        let summary = Dispatcher::new(temp.path(), Some(".txt"), 3).dispatch(&queue)?;
        assert_eq!(summary, DispatchSummary { items: 2, sentinels: 3 });

        let items = drain(&queue);
        let files: BTreeSet<_> = items
            .iter()
            .filter_map(WorkItem::path)
            .map(Path::to_path_buf)
            .collect();
        assert_eq!(
            files,
            BTreeSet::from([temp.path().join("a.txt"), temp.path().join("b.txt")])
        );
        assert!(items[2..].iter().all(WorkItem::is_stop));
        Ok(())
    }

    #[test]
    fn no_matches_still_enqueues_sentinels() -> Result<()> {
        let temp = temp_dir()?;
        write_files(temp.path(), &[("a.csv", "a")])?;
        let queue = WorkQueue::new();

        let summary = Dispatcher::new(temp.path(), Some(".txt"), 2).dispatch(&queue)?;
        assert_eq!(summary, DispatchSummary { items: 0, sentinels: 2 });
        assert_eq!(queue.len(), 2);
        Ok(())
    }

    #[test]
    fn enumeration_failure_still_releases_workers() -> Result<()> {
        let temp = temp_dir()?;
        let queue = WorkQueue::new();

        let result = Dispatcher::new(temp.path().join("gone"), Some(".txt"), 2).dispatch(&queue);
        assert!(matches!(
            result,
            Err(FsOpsError::Io {
                operation: "dispatch.read_dir",
                ..
            })
        ));
        assert_eq!(drain(&queue), vec![WorkItem::Stop, WorkItem::Stop]);
        Ok(())
    }
}
