#![forbid(unsafe_code)]

use crate::domain::{EntryDescriptor, Permissions};
use crate::error::Error;
use nix::sys::stat::{SFlag, lstat};
use std::path::Path;

/// Describe the entry at `path` without following symlinks. A symlink to a
/// directory is reported as a non-directory, so it is never descended into.
pub fn read_entry(path: &Path) -> Result<EntryDescriptor, Error> {
    let stat = lstat(path).map_err(|source| Error::Metadata {
        path: path.to_path_buf(),
        source,
    })?;

    let kind = SFlag::from_bits_truncate(stat.st_mode & SFlag::S_IFMT.bits());

    Ok(EntryDescriptor {
        path: path.to_path_buf(),
        size_bytes: u64::try_from(stat.st_size).unwrap_or(0),
        permissions: Permissions::from_mode(u32::from(stat.st_mode)),
        hard_links: stat.st_nlink as u64,
        is_directory: kind == SFlag::S_IFDIR,
    })
}
