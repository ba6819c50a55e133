#![forbid(unsafe_code)]

use super::Permissions;
use std::path::PathBuf;

/// Metadata of one filesystem entry, captured with `lstat` at traversal
/// time. Never updated afterwards: a snapshot records the entry as it was
/// seen, even if the entry is quarantined later in the same pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDescriptor {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub permissions: Permissions,
    pub hard_links: u64,
    pub is_directory: bool,
}

impl EntryDescriptor {
    /// No access bits for owner, group or other.
    pub fn is_suspicious(&self) -> bool {
        self.permissions.is_empty()
    }
}
