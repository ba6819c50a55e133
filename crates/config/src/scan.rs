#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Scan {
    /// Directory trees captured on every run. Roots given on the command
    /// line are appended to this list.
    ///
    /// # Note
    ///
    /// Snapshot artifacts are named after the base name of each root, so two
    /// roots sharing a base name (`/srv/a/data` and `/srv/b/data`) cannot be
    /// scanned in the same run.
    pub monitored: Vec<PathBuf>,

    /// Where snapshot artifacts are written. Exactly one artifact per
    /// monitored directory is left here after each run. Created if missing.
    pub output_dir: PathBuf,

    /// Flat directory receiving entries the analyzer flagged as unsafe.
    /// An entry whose base name is already present overwrites it. Created if
    /// missing.
    pub isolation_dir: PathBuf,

    /// Visit directory entries in name order instead of the order the
    /// filesystem lists them. Without sorting, two scans of an unchanged
    /// tree may produce different artifacts and be reported as changed.
    pub sort_entries: bool,
}

impl Default for Scan {
    fn default() -> Self {
        Self {
            monitored: Vec::new(),
            output_dir: PathBuf::from("snapshots"),
            isolation_dir: PathBuf::from("isolation"),
            sort_entries: true,
        }
    }
}
