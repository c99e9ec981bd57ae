//! Scratch directory fixtures and helpers for inspecting file trees.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::TempDir;
use walkdir::WalkDir;

/// Fresh temporary directory removed when the handle drops.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn temp_dir() -> Result<TempDir> {
    tempfile::Builder::new()
        .prefix("ferry-")
        .tempdir()
        .context("failed to create temporary directory")
}

/// Create files under `root` from `(relative path, contents)` pairs.
///
/// Paths ending in `/` create an empty directory instead. Missing parents are created.
///
/// # Errors
///
/// Returns an error if any directory or file cannot be written.
pub fn write_files(root: &Path, files: &[(&str, &str)]) -> Result<()> {
    fs::create_dir_all(root).with_context(|| format!("failed to create {}", root.display()))?;
    for (relative, contents) in files {
        let path = root.join(relative);
        if relative.ends_with('/') {
            fs::create_dir_all(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            continue;
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}

/// Every regular file below `root`, keyed by its `/`-joined relative path.
///
/// # Errors
///
/// Returns an error if the tree cannot be walked or a file cannot be read as UTF-8.
pub fn read_tree(root: &Path) -> Result<BTreeMap<String, String>> {
    let mut tree = BTreeMap::new();
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root)?;
        let key = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let contents = fs::read_to_string(entry.path())
            .with_context(|| format!("failed to read {}", entry.path().display()))?;
        tree.insert(key, contents);
    }
    Ok(tree)
}

/// Names of the direct entries of `dir`, sorted.
///
/// # Errors
///
/// Returns an error if the directory cannot be listed.
pub fn file_names(dir: &Path) -> Result<Vec<String>> {
    let mut names = fs::read_dir(dir)
        .with_context(|| format!("failed to list {}", dir.display()))?
        .map(|entry| entry.map(|entry| entry.file_name().to_string_lossy().into_owned()))
        .collect::<std::io::Result<Vec<_>>>()?;
    names.sort();
    Ok(names)
}

/// Whether the tests run with root privileges, which bypass permission bits.
#[must_use]
pub fn running_as_root() -> bool {
    #[cfg(unix)]
    {
        nix::unistd::geteuid().is_root()
    }
    #[cfg(not(unix))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_tree_lists_files_only() -> Result<()> {
        let temp = temp_dir()?;
        write_files(
            temp.path(),
            &[("a.txt", "a"), ("nested/b.txt", "b"), ("empty/", "")],
        )?;

        let tree = read_tree(temp.path())?;
        assert_eq!(
            tree.into_iter().collect::<Vec<_>>(),
            vec![
                ("a.txt".to_string(), "a".to_string()),
                ("nested/b.txt".to_string(), "b".to_string()),
            ]
        );
        assert!(temp.path().join("empty").is_dir());
        Ok(())
    }

    #[test]
    fn file_names_are_sorted_direct_entries() -> Result<()> {
        let temp = temp_dir()?;
        write_files(temp.path(), &[("b.txt", ""), ("a.txt", ""), ("dir/c.txt", "")])?;
        assert_eq!(file_names(temp.path())?, vec!["a.txt", "b.txt", "dir"]);
        Ok(())
    }

    #[test]
    fn temp_dir_uses_ferry_prefix() -> Result<()> {
        let temp = temp_dir()?;
        let name = temp
            .path()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        assert!(name.starts_with("ferry-"));
        Ok(())
    }
}
