#![forbid(unsafe_code)]

use crate::analysis::Analyzer;
use crate::domain::Verdict;
use crate::error::Error;
use nix::fcntl::AT_FDCWD;
use nix::sys::stat::{FchmodatFlags, Mode, SFlag, fchmodat, lstat, mode_t};
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Mode set on a suspicious entry while the analyzer reads it.
pub const GRANT_MODE: u32 = 0o400;
/// Mode restored once the analyzer is done, whatever the verdict.
pub const REVOKED_MODE: u32 = 0o000;

/// Runs the analyzer against one suspicious entry at a time.
///
/// Each analysis is a separate task on the runtime that drives the analyzer
/// process and reports exactly one result over a oneshot channel. The caller
/// blocks until that result has arrived and the task has finished, so a
/// directory worker never has more than one analysis outstanding.
pub struct AnalysisWorker {
    analyzer: Arc<dyn Analyzer>,
    timeout: Duration,
    runtime: Handle,
    cancel: CancellationToken,
}

impl AnalysisWorker {
    pub fn new(
        analyzer: Arc<dyn Analyzer>,
        timeout: Duration,
        runtime: Handle,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            analyzer,
            timeout,
            runtime,
            cancel,
        }
    }

    /// Analyze `path` and wait for the verdict.
    ///
    /// # Panics
    ///
    /// Must be called from a thread that is not driving the runtime (for
    /// example a `spawn_blocking` task); blocking inside an async context
    /// panics.
    pub fn analyze(&self, path: &Path) -> Verdict {
        let (tx, rx) = oneshot::channel();
        let analyzer = Arc::clone(&self.analyzer);
        let target = path.to_path_buf();
        let timeout = self.timeout;
        let cancel = self.cancel.clone();

        let task = self.runtime.spawn(async move {
            let result = inspect(analyzer.as_ref(), &target, timeout, &cancel).await;
            // The receiver only disappears if the directory worker is gone.
            let _ = tx.send(result);
        });

        let received = self.runtime.block_on(async move {
            let received = rx.await;
            if let Err(err) = task.await {
                warn!(%err, "analysis task did not run to completion");
            }
            received
        });

        let result = received.unwrap_or_else(|_| {
            Err(Error::IsolationProtocol {
                path: path.to_path_buf(),
            })
        });

        match result {
            Ok(status) => Verdict::from_status(status),
            Err(err) => Verdict::from_error(&err),
        }
    }
}

async fn inspect(
    analyzer: &dyn Analyzer,
    path: &Path,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<i32, Error> {
    let _grant = AccessGrant::acquire(path)?;

    tokio::select! {
        result = tokio::time::timeout(timeout, analyzer.analyze(path)) => match result {
            Ok(result) => result,
            Err(_) => Err(Error::AnalyzerTimeout {
                path: path.to_path_buf(),
                timeout,
            }),
        },
        _ = cancel.cancelled() => Err(Error::Cancelled),
    }
}

/// Temporary owner-read access, revoked on drop. Dropping also covers a
/// timed-out, cancelled or panicking analysis.
struct AccessGrant<'a> {
    path: &'a Path,
}

impl<'a> AccessGrant<'a> {
    fn acquire(path: &'a Path) -> Result<Self, Error> {
        set_mode(path, GRANT_MODE)?;
        debug!(path = %path.display(), "temporary read access granted");
        Ok(Self { path })
    }
}

impl Drop for AccessGrant<'_> {
    fn drop(&mut self) {
        match set_mode(self.path, REVOKED_MODE) {
            Ok(()) => debug!(path = %self.path.display(), "read access revoked"),
            Err(err) => warn!(%err, "failed to revoke temporary read access"),
        }
    }
}

/// Change the mode of `path` itself. A symlink swapped in after the walk is
/// refused, never followed.
fn set_mode(path: &Path, mode: u32) -> Result<(), Error> {
    let permission_error = |source: std::io::Error| Error::Permission {
        path: path.to_path_buf(),
        source,
    };

    let stat = lstat(path).map_err(|errno| permission_error(errno.into()))?;
    if SFlag::from_bits_truncate(stat.st_mode & SFlag::S_IFMT.bits()) == SFlag::S_IFLNK {
        return Err(permission_error(std::io::Error::new(
            ErrorKind::InvalidInput,
            "entry is a symbolic link",
        )));
    }

    fchmodat(
        AT_FDCWD,
        path,
        Mode::from_bits_truncate(mode as mode_t),
        FchmodatFlags::NoFollowSymlink,
    )
    .map_err(|errno| permission_error(errno.into()))
}
