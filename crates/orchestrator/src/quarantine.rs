#![forbid(unsafe_code)]

use crate::error::Error;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

/// Where a quarantined entry came from and where it went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarantineRecord {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Moves entries flagged as unsafe into a flat isolation directory.
///
/// Moves are a single `rename`, so an entry is never visible half-copied and
/// several directory workers can share the same isolation directory. An entry
/// already present under the same base name is replaced.
#[derive(Debug, Clone)]
pub struct Quarantine {
    isolation_dir: PathBuf,
}

impl Quarantine {
    pub fn new(isolation_dir: impl Into<PathBuf>) -> Self {
        Self {
            isolation_dir: isolation_dir.into(),
        }
    }

    /// Move `path` to `<isolation_dir>/<base name>`.
    ///
    /// On failure (another filesystem, permission denied) the entry stays
    /// where it was.
    pub fn isolate(&self, path: &Path) -> Result<QuarantineRecord, Error> {
        let Some(name) = path.file_name() else {
            return Err(Error::QuarantineMove {
                from: path.to_path_buf(),
                to: self.isolation_dir.clone(),
                source: std::io::Error::new(ErrorKind::InvalidInput, "entry has no base name"),
            });
        };
        let destination = self.isolation_dir.join(name);

        std::fs::rename(path, &destination).map_err(|source| Error::QuarantineMove {
            from: path.to_path_buf(),
            to: destination.clone(),
            source,
        })?;

        info!(
            source = %path.display(),
            destination = %destination.display(),
            "entry quarantined"
        );
        Ok(QuarantineRecord {
            source: path.to_path_buf(),
            destination,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn moves_entry_keeping_base_name() {
        let dir = tempdir().unwrap();
        let isolation = dir.path().join("isolation");
        std::fs::create_dir(&isolation).unwrap();
        let source = dir.path().join("payload.bin");
        std::fs::write(&source, b"payload").unwrap();

        let record = Quarantine::new(&isolation).isolate(&source).unwrap();

        assert_eq!(record.destination, isolation.join("payload.bin"));
        assert!(!source.exists());
        assert_eq!(std::fs::read(&record.destination).unwrap(), b"payload");
    }

    #[test]
    fn same_name_overwrites_previous_occupant() {
        let dir = tempdir().unwrap();
        let isolation = dir.path().join("isolation");
        std::fs::create_dir(&isolation).unwrap();
        std::fs::write(isolation.join("dup"), b"old").unwrap();
        let source = dir.path().join("dup");
        std::fs::write(&source, b"new").unwrap();

        Quarantine::new(&isolation).isolate(&source).unwrap();

        assert_eq!(std::fs::read(isolation.join("dup")).unwrap(), b"new");
    }

    #[test]
    fn failed_move_leaves_entry_in_place() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("stuck");
        std::fs::write(&source, b"data").unwrap();

        let err = Quarantine::new(dir.path().join("missing"))
            .isolate(&source)
            .unwrap_err();

        assert!(matches!(err, Error::QuarantineMove { .. }));
        assert!(source.exists());
    }
}
