#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

pub const MIN_CHUNK_SIZE: usize = 64;
pub const MAX_CHUNK_SIZE: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Snapshot {
    /// Size of the blocks compared when deciding whether two snapshot
    /// artifacts differ (clamped to 64..=1048576 bytes).
    pub chunk_size: usize,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self { chunk_size: 4096 }
    }
}

impl Snapshot {
    pub fn clamp(self) -> Self {
        Self {
            chunk_size: self.chunk_size.clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE),
        }
    }
}
