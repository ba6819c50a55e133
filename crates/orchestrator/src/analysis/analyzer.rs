#![forbid(unsafe_code)]

use crate::error::Error;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Inspect the content at `path` and return the analyzer's exit status:
    /// 0 for safe, anything else for unsafe. An `Err` means no status was
    /// produced.
    async fn analyze(&self, path: &Path) -> Result<i32, Error>;
}

/// Runs an external program as `program [args...] <path>`.
///
/// The child is killed if the returned future is dropped, which is how the
/// analysis timeout and cancellation stop a hanging analyzer.
#[derive(Debug, Clone)]
pub struct CommandAnalyzer {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandAnalyzer {
    pub fn new(config: &config::Analysis) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }
}

#[async_trait]
impl Analyzer for CommandAnalyzer {
    async fn analyze(&self, path: &Path) -> Result<i32, Error> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| Error::AnalyzerLaunch {
                program: self.program.clone(),
                source,
            })?;

        debug!(
            path = %path.display(),
            status = ?output.status,
            stdout = %String::from_utf8_lossy(&output.stdout).trim(),
            stderr = %String::from_utf8_lossy(&output.stderr).trim(),
            "analyzer finished"
        );

        output.status.code().ok_or_else(|| Error::AnalyzerSignaled {
            path: path.to_path_buf(),
        })
    }
}
