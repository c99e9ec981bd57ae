//! Directory precondition checks run before any transfer work starts.
//!
//! # Design
//! - Probe capabilities with OS access checks instead of attempting an operation.
//! - Report the first failing role and capability; no partial work is ever attempted.

use std::fs;
use std::io;
use std::path::Path;

#[cfg(unix)]
use nix::unistd::{AccessFlags, access};

use crate::error::{Capability, DirectoryRole, FsOpsError, FsOpsResult};

const SOURCE_CHECKS: &[Capability] = &[Capability::Exists, Capability::Directory, Capability::Read];
const DESTINATION_CHECKS: &[Capability] =
    &[Capability::Exists, Capability::Directory, Capability::Write];

/// Verify that `source_dir` is readable and `destination` is writable.
///
/// # Errors
///
/// Returns [`FsOpsError::Access`] naming the directory role and capability that failed.
pub fn validate(source_dir: &Path, destination: &Path) -> FsOpsResult<()> {
    check_directory(DirectoryRole::Source, source_dir, SOURCE_CHECKS)?;
    check_directory(DirectoryRole::Destination, destination, DESTINATION_CHECKS)
}

fn check_directory(
    role: DirectoryRole,
    path: &Path,
    capabilities: &[Capability],
) -> FsOpsResult<()> {
    for &capability in capabilities {
        probe(path, capability).map_err(|source| FsOpsError::Access {
            role,
            capability,
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

fn probe(path: &Path, capability: Capability) -> io::Result<()> {
    match capability {
        Capability::Directory => {
            if fs::metadata(path)?.is_dir() {
                Ok(())
            } else {
                Err(io::Error::from(io::ErrorKind::NotADirectory))
            }
        }
        Capability::Exists | Capability::Read | Capability::Write => {
            probe_access(path, capability)
        }
    }
}

#[cfg(unix)]
fn probe_access(path: &Path, capability: Capability) -> io::Result<()> {
    let flags = match capability {
        Capability::Read => AccessFlags::R_OK | AccessFlags::X_OK,
        Capability::Write => AccessFlags::W_OK | AccessFlags::X_OK,
        Capability::Exists | Capability::Directory => AccessFlags::F_OK,
    };
    access(path, flags).map_err(io::Error::from)
}

#[cfg(not(unix))]
fn probe_access(path: &Path, capability: Capability) -> io::Result<()> {
    match capability {
        Capability::Read => fs::read_dir(path).map(|_| ()),
        Capability::Write => {
            if fs::metadata(path)?.permissions().readonly() {
                Err(io::Error::from(io::ErrorKind::PermissionDenied))
            } else {
                Ok(())
            }
        }
        Capability::Exists | Capability::Directory => fs::metadata(path).map(|_| ()),
    }
}
