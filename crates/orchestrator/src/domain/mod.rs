#![forbid(unsafe_code)]

mod entry;
mod permissions;
mod stats;
mod verdict;

pub use entry::EntryDescriptor;
pub use permissions::Permissions;
pub use stats::DirectoryStats;
pub use verdict::Verdict;
