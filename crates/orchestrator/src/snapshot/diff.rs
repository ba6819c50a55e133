#![forbid(unsafe_code)]

use crate::domain::EntryDescriptor;
use crate::error::Error;
use std::collections::HashMap;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

/// Compare two artifacts byte for byte, `chunk_size` bytes at a time.
///
/// Every chunk is filled completely before it is compared (only the last one
/// may be short), so both sides are always compared at the same offsets and
/// a short read can never make identical artifacts look different.
pub fn differs(a: impl AsRef<Path>, b: impl AsRef<Path>, chunk_size: usize) -> Result<bool, Error> {
    let (a, b) = (a.as_ref(), b.as_ref());
    let chunk_size = chunk_size.max(1);
    let mut left = open(a)?;
    let mut right = open(b)?;
    let mut left_buf = vec![0u8; chunk_size];
    let mut right_buf = vec![0u8; chunk_size];

    loop {
        let left_len = fill(&mut left, &mut left_buf).map_err(|source| io_error(a, source))?;
        let right_len = fill(&mut right, &mut right_buf).map_err(|source| io_error(b, source))?;

        if left_len != right_len || left_buf[..left_len] != right_buf[..right_len] {
            return Ok(true);
        }
        if left_len < chunk_size {
            return Ok(false);
        }
    }
}

/// Paths that appeared, disappeared or changed metadata between two
/// snapshots of the same directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub added: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
    pub modified: Vec<PathBuf>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }
}

/// Per-path comparison. Results keep the order of the snapshot they come
/// from (`current` for added and modified, `previous` for removed).
pub fn changes(previous: &[EntryDescriptor], current: &[EntryDescriptor]) -> ChangeSet {
    let before: HashMap<&Path, &EntryDescriptor> =
        previous.iter().map(|e| (e.path.as_path(), e)).collect();
    let after: HashMap<&Path, &EntryDescriptor> =
        current.iter().map(|e| (e.path.as_path(), e)).collect();

    let mut set = ChangeSet::default();
    for entry in current {
        match before.get(entry.path.as_path()) {
            None => set.added.push(entry.path.clone()),
            Some(old) if *old != entry => set.modified.push(entry.path.clone()),
            Some(_) => {}
        }
    }
    set.removed = previous
        .iter()
        .filter(|e| !after.contains_key(e.path.as_path()))
        .map(|e| e.path.clone())
        .collect();
    set
}

fn open(path: &Path) -> Result<File, Error> {
    File::open(path).map_err(|source| io_error(path, source))
}

fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::SnapshotIo {
        path: path.to_path_buf(),
        source,
    }
}

fn fill(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}
