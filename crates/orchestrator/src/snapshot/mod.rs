#![forbid(unsafe_code)]

mod diff;
pub mod format;
mod store;

pub use diff::{ChangeSet, changes, differs};
pub use store::{
    SNAPSHOT_MARKER, SnapshotHandle, SnapshotStore, TIMESTAMP_FORMAT, artifact_file_name,
    parse_artifact_file_name,
};
