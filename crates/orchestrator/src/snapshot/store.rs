#![forbid(unsafe_code)]

use crate::clock::Clock;
use crate::domain::EntryDescriptor;
use crate::error::Error;
use crate::snapshot::format;
use chrono::{DateTime, NaiveDateTime, SubsecRound, TimeDelta, Utc};
use std::fs::OpenOptions;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

pub const SNAPSHOT_MARKER: &str = "_Snapshot_";
pub const SNAPSHOT_EXTENSION: &str = ".txt";
/// Fixed width, so name order and time order agree.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S%.6f";

/// One artifact on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotHandle {
    pub name: String,
    pub taken_at: DateTime<Utc>,
    pub path: PathBuf,
}

impl AsRef<Path> for SnapshotHandle {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// `<name>_Snapshot_<timestamp>.txt`
pub fn artifact_file_name(name: &str, taken_at: DateTime<Utc>) -> String {
    format!(
        "{name}{SNAPSHOT_MARKER}{}{SNAPSHOT_EXTENSION}",
        taken_at.format(TIMESTAMP_FORMAT)
    )
}

/// Timestamp of an artifact belonging to `name`, or `None` for any other
/// file, including artifacts of directories whose name merely starts with
/// `name`.
pub fn parse_artifact_file_name(name: &str, file_name: &str) -> Option<DateTime<Utc>> {
    let timestamp = file_name
        .strip_prefix(name)?
        .strip_prefix(SNAPSHOT_MARKER)?
        .strip_suffix(SNAPSHOT_EXTENSION)?;
    NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Write-once snapshot artifacts in a shared output directory. Every
/// operation only touches artifacts of the monitored name it is given.
pub struct SnapshotStore {
    output_dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl SnapshotStore {
    pub fn new(output_dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            output_dir: output_dir.into(),
            clock,
        }
    }

    /// Write `entries` to a new artifact. An artifact is never overwritten:
    /// if the timestamp is already taken it is moved forward by a
    /// microsecond until the name is free.
    pub fn persist(
        &self,
        name: &str,
        entries: &[EntryDescriptor],
    ) -> Result<SnapshotHandle, Error> {
        // Names carry microseconds; keep the handle equal to what a listing parses.
        let mut taken_at = self.clock.now().trunc_subsecs(6);
        loop {
            let path = self.output_dir.join(artifact_file_name(name, taken_at));
            let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    taken_at += TimeDelta::microseconds(1);
                    continue;
                }
                Err(source) => return Err(Error::SnapshotIo { path, source }),
            };

            let mut out = BufWriter::new(file);
            let written = format::write_entries(&mut out, entries)
                .and_then(|()| out.flush())
                .and_then(|()| out.get_ref().sync_all());
            if let Err(source) = written {
                drop(out);
                if let Err(err) = std::fs::remove_file(&path) {
                    warn!(%err, path = %path.display(), "failed to remove partial snapshot");
                }
                return Err(Error::SnapshotIo { path, source });
            }

            debug!(path = %path.display(), entries = entries.len(), "snapshot written");
            return Ok(SnapshotHandle {
                name: name.to_owned(),
                taken_at,
                path,
            });
        }
    }

    /// All artifacts of `name`, oldest first.
    pub fn artifacts(&self, name: &str) -> Result<Vec<SnapshotHandle>, Error> {
        let read_dir = std::fs::read_dir(&self.output_dir).map_err(|source| self.io_error(source))?;

        let mut handles = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|source| self.io_error(source))?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if let Some(taken_at) = parse_artifact_file_name(name, file_name) {
                handles.push(SnapshotHandle {
                    name: name.to_owned(),
                    taken_at,
                    path: entry.path(),
                });
            }
        }
        handles.sort_by(|a, b| a.taken_at.cmp(&b.taken_at).then_with(|| a.path.cmp(&b.path)));
        Ok(handles)
    }

    /// The newest artifact of `name` other than `excluding`, by embedded
    /// timestamp rather than listing order.
    pub fn find_most_recent_prior(
        &self,
        name: &str,
        excluding: &SnapshotHandle,
    ) -> Result<Option<SnapshotHandle>, Error> {
        Ok(self
            .artifacts(name)?
            .into_iter()
            .rfind(|handle| handle.path != excluding.path))
    }

    pub fn load(&self, handle: &SnapshotHandle) -> Result<Vec<EntryDescriptor>, Error> {
        let text = std::fs::read_to_string(&handle.path).map_err(|source| Error::SnapshotIo {
            path: handle.path.clone(),
            source,
        })?;
        format::parse(&handle.path, &text)
    }

    /// Delete every artifact of `keep.name` except `keep`, leaving it as the
    /// single previous snapshot of that directory. Deletion continues past
    /// failures; the first one is returned.
    pub fn retain(&self, keep: &SnapshotHandle) -> Result<(), Error> {
        let mut first_error = None;
        for handle in self.artifacts(&keep.name)? {
            if handle.path == keep.path {
                continue;
            }
            match std::fs::remove_file(&handle.path) {
                Ok(()) => debug!(path = %handle.path.display(), "snapshot removed"),
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(source) => {
                    warn!(%source, path = %handle.path.display(), "failed to remove snapshot");
                    first_error.get_or_insert(Error::SnapshotIo {
                        path: handle.path,
                        source,
                    });
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn io_error(&self, source: std::io::Error) -> Error {
        Error::SnapshotIo {
            path: self.output_dir.clone(),
            source,
        }
    }
}
