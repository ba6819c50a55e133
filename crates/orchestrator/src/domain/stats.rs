#![forbid(unsafe_code)]

use std::ops::AddAssign;

/// Counters for one directory worker's scan pass. Each worker owns its own
/// copy; totals are only formed once the workers have returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectoryStats {
    /// Descriptors written to the snapshot.
    pub entries: usize,
    /// Entries with no access bits, each analyzed once.
    pub suspicious: usize,
    /// Entries moved into the isolation directory.
    pub quarantined: usize,
    /// Suspicious entries for which the analyzer produced no status.
    pub analysis_failures: usize,
    /// Entries whose metadata could not be read plus subtrees that could not
    /// be listed.
    pub skipped: usize,
}

impl AddAssign for DirectoryStats {
    fn add_assign(&mut self, rhs: Self) {
        self.entries += rhs.entries;
        self.suspicious += rhs.suspicious;
        self.quarantined += rhs.quarantined;
        self.analysis_failures += rhs.analysis_failures;
        self.skipped += rhs.skipped;
    }
}
