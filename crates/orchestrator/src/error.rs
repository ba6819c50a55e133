#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Monitored directory does not exist: {}", path.display())]
    PathNotFound { path: PathBuf },

    #[error("Failed to open monitored directory {}: {source}", path.display())]
    OpenRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to get information for {}: {source}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: nix::Error,
    },

    #[error("Failed to open directory {}: {source}", path.display())]
    OpenDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Analysis of {} ended without delivering a status", path.display())]
    IsolationProtocol { path: PathBuf },

    #[error("Failed to launch analyzer {}: {source}", program.display())]
    AnalyzerLaunch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Analyzer did not finish within {timeout:?} for {}", path.display())]
    AnalyzerTimeout { path: PathBuf, timeout: Duration },

    #[error("Analyzer was terminated by a signal while inspecting {}", path.display())]
    AnalyzerSignaled { path: PathBuf },

    #[error("Failed to change permissions of {}: {source}", path.display())]
    Permission {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move {} into {}: {source}", from.display(), to.display())]
    QuarantineMove {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Snapshot I/O failed on {}: {source}", path.display())]
    SnapshotIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed snapshot record in {} at line {line}", path.display())]
    SnapshotFormat { path: PathBuf, line: usize },

    #[error("Cannot derive a snapshot name from {}", path.display())]
    SnapshotName { path: PathBuf },

    #[error("Failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} has the same name `{name}` as another monitored directory", path.display())]
    DuplicateName { path: PathBuf, name: String },

    #[error("Scan cancelled")]
    Cancelled,

    #[error("Directory worker panicked: {0}")]
    WorkerPanicked(String),
}
