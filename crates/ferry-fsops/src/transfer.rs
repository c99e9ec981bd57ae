//! Copy and move primitives applied to a single work item.
//!
//! # Design
//! - Directory copies merge into the target: existing files at matching relative
//!   paths are overwritten, unrelated files are left alone.
//! - Moves try a rename first and fall back to copy-then-remove (cross-device).
//! - Errors carry the failing operation label and path.

use std::fs;
use std::path::{Path, PathBuf};

use ferry_config::Operation;
use walkdir::WalkDir;

use crate::error::{FsOpsError, FsOpsResult};

/// Transfer one source entry into `destination_dir`, keeping its file name.
///
/// Returns the path the entry now lives at.
///
/// # Errors
///
/// Returns an error if the entry has no file name or the copy/move fails.
pub fn transfer_entry(
    operation: Operation,
    source: &Path,
    destination_dir: &Path,
) -> FsOpsResult<PathBuf> {
    let name = source.file_name().ok_or_else(|| FsOpsError::InvalidInput {
        field: "source_path",
        reason: "missing_file_name",
        value: Some(source.to_string_lossy().into_owned()),
    })?;
    let target = destination_dir.join(name);

    match operation {
        Operation::Copy => copy_tree(source, &target)?,
        Operation::Move => move_tree(source, &target)?,
    }
    Ok(target)
}

/// Merge the contents of `source_dir` into `destination_dir`.
///
/// A move relocates every top-level entry and leaves the emptied `source_dir` in place.
///
/// # Errors
///
/// Returns the first copy/move failure; entries handled before it stay transferred.
pub fn merge_directory(
    operation: Operation,
    source_dir: &Path,
    destination_dir: &Path,
) -> FsOpsResult<()> {
    match operation {
        Operation::Copy => copy_tree(source_dir, destination_dir),
        Operation::Move => {
            let entries = fs::read_dir(source_dir)
                .map_err(|source| FsOpsError::io("merge_directory.read_dir", source_dir, source))?;
            for entry in entries {
                let entry = entry.map_err(|source| {
                    FsOpsError::io("merge_directory.read_entry", source_dir, source)
                })?;
                move_tree(&entry.path(), &destination_dir.join(entry.file_name()))?;
            }
            Ok(())
        }
    }
}

pub(crate) fn copy_tree(source: &Path, destination: &Path) -> FsOpsResult<()> {
    if !source.is_dir() {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|source_err| {
                FsOpsError::io("copy_tree.create_parent", parent, source_err)
            })?;
        }
        fs::copy(source, destination)
            .map_err(|source_err| FsOpsError::io("copy_tree.copy_file", source, source_err))?;
        return Ok(());
    }

    fs::create_dir_all(destination)
        .map_err(|source_err| FsOpsError::io("copy_tree.create_dir", destination, source_err))?;

    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry
            .map_err(|source_err| FsOpsError::walkdir("copy_tree.walk", source, source_err))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|_| FsOpsError::InvalidInput {
                field: "source_path",
                reason: "strip_prefix",
                value: Some(entry.path().to_string_lossy().into_owned()),
            })?;
        let target_path = destination.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target_path).map_err(|source_err| {
                FsOpsError::io("copy_tree.create_dir", &target_path, source_err)
            })?;
        } else {
            fs::copy(entry.path(), &target_path).map_err(|source_err| {
                FsOpsError::io("copy_tree.copy_entry", entry.path(), source_err)
            })?;
        }
    }

    Ok(())
}

pub(crate) fn move_tree(source: &Path, destination: &Path) -> FsOpsResult<()> {
    if fs::rename(source, destination).is_ok() {
        return Ok(());
    }

    copy_tree(source, destination)?;
    let removal = if source.is_dir() {
        fs::remove_dir_all(source)
    } else {
        fs::remove_file(source)
    };
    removal.map_err(|source_err| FsOpsError::io("move_tree.cleanup", source, source_err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use ferry_test_support::fixtures::{read_tree, temp_dir, write_files};

    #[test]
    fn copy_entry_keeps_source_and_returns_target() -> Result<()> {
        let temp = temp_dir()?;
        let source = temp.path().join("source");
        let destination = temp.path().join("destination");
        write_files(&source, &[("report.txt", "q3")])?;
        fs::create_dir_all(&destination)?;

        let target = transfer_entry(Operation::Copy, &source.join("report.txt"), &destination)?;
        assert_eq!(target, destination.join("report.txt"));
        assert_eq!(fs::read_to_string(&target)?, "q3");
        assert!(source.join("report.txt").exists());
        Ok(())
    }

    #[test]
    fn move_entry_removes_source_and_overwrites_target() -> Result<()> {
        let temp = temp_dir()?;
        let source = temp.path().join("source");
        let destination = temp.path().join("destination");
        write_files(&source, &[("report.txt", "new")])?;
        write_files(&destination, &[("report.txt", "old")])?;

        transfer_entry(Operation::Move, &source.join("report.txt"), &destination)?;
        assert_eq!(
            fs::read_to_string(destination.join("report.txt"))?,
            "new"
        );
        assert!(!source.join("report.txt").exists());
        Ok(())
    }

    #[test]
    fn copy_entry_fails_when_target_is_a_directory() -> Result<()> {
        let temp = temp_dir()?;
        let source = temp.path().join("source");
        let destination = temp.path().join("destination");
        write_files(&source, &[("clash.txt", "data")])?;
        fs::create_dir_all(destination.join("clash.txt"))?;

        let result = transfer_entry(Operation::Copy, &source.join("clash.txt"), &destination);
        assert!(matches!(
            result,
            Err(FsOpsError::Io {
                operation: "copy_tree.copy_file",
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn failed_move_keeps_the_source() -> Result<()> {
        let temp = temp_dir()?;
        let source = temp.path().join("source");
        let destination = temp.path().join("destination");
        write_files(&source, &[("clash.txt", "data")])?;
        write_files(&destination.join("clash.txt"), &[("inner.txt", "occupied")])?;

        let result = transfer_entry(Operation::Move, &source.join("clash.txt"), &destination);
        assert!(result.is_err());
        assert!(source.join("clash.txt").is_file());
        Ok(())
    }

    #[test]
    fn copy_merge_overwrites_matching_paths_and_keeps_others() -> Result<()> {
        let temp = temp_dir()?;
        let source = temp.path().join("source");
        let destination = temp.path().join("destination");
        write_files(
            &source,
            &[("a.txt", "a-new"), ("nested/b.txt", "b-new"), ("empty/", "")],
        )?;
        write_files(&destination, &[("a.txt", "a-old"), ("keep.txt", "keep")])?;

        merge_directory(Operation::Copy, &source, &destination)?;

        let tree = read_tree(&destination)?;
        assert_eq!(tree.get("a.txt").map(String::as_str), Some("a-new"));
        assert_eq!(tree.get("nested/b.txt").map(String::as_str), Some("b-new"));
        assert_eq!(tree.get("keep.txt").map(String::as_str), Some("keep"));
        assert!(destination.join("empty").is_dir());
        assert_eq!(read_tree(&source)?.len(), 2);
        Ok(())
    }

    #[test]
    fn move_merge_relocates_entries_and_leaves_empty_source() -> Result<()> {
        let temp = temp_dir()?;
        let source = temp.path().join("source");
        let destination = temp.path().join("destination");
        write_files(&source, &[("a.txt", "a"), ("nested/b.txt", "b")])?;
        write_files(&destination, &[("nested/c.txt", "c")])?;

        merge_directory(Operation::Move, &source, &destination)?;

        let tree = read_tree(&destination)?;
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.get("nested/b.txt").map(String::as_str), Some("b"));
        assert_eq!(tree.get("nested/c.txt").map(String::as_str), Some("c"));
        assert!(source.is_dir());
        assert_eq!(fs::read_dir(&source)?.count(), 0);
        Ok(())
    }
}
