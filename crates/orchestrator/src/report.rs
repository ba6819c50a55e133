#![forbid(unsafe_code)]

use crate::domain::DirectoryStats;
use crate::error::Error;
use crate::snapshot::ChangeSet;
use std::path::{Path, PathBuf};

/// What happened to the snapshot history of one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// No earlier snapshot existed; the new one becomes the previous.
    Initial,
    /// Identical to the previous snapshot; the new one was discarded.
    Unchanged,
    /// The new snapshot replaced the previous one. `changes` is `None` when
    /// the previous artifact could not be read back for details.
    Changed { changes: Option<ChangeSet> },
    /// The artifacts could not be compared; the previous one was kept and
    /// the new one discarded.
    ComparisonFailed { reason: String },
}

impl SnapshotOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Unchanged => "unchanged",
            Self::Changed { .. } => "changed",
            Self::ComparisonFailed { .. } => "comparison failed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DirectoryReport {
    pub name: String,
    pub root: PathBuf,
    /// The single artifact left in the output directory for this root.
    pub snapshot: PathBuf,
    pub outcome: SnapshotOutcome,
    pub stats: DirectoryStats,
}

impl DirectoryReport {
    /// Entries found corrupted and moved to isolation.
    pub fn corrupted(&self) -> usize {
        self.stats.quarantined
    }
}

/// Results in the order the roots were given.
#[derive(Debug)]
pub struct RunReport {
    pub directories: Vec<(PathBuf, Result<DirectoryReport, Error>)>,
}

impl RunReport {
    /// Sum of the counters of every directory that completed.
    pub fn totals(&self) -> DirectoryStats {
        let mut totals = DirectoryStats::default();
        for report in self.completed() {
            totals += report.stats;
        }
        totals
    }

    pub fn completed(&self) -> impl Iterator<Item = &DirectoryReport> {
        self.directories
            .iter()
            .filter_map(|(_, result)| result.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Path, &Error)> {
        self.directories
            .iter()
            .filter_map(|(root, result)| result.as_ref().err().map(|err| (root.as_path(), err)))
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}
