#![forbid(unsafe_code)]

use crate::analysis::{AnalysisWorker, Analyzer, RiskEvaluator, RiskOutcome};
use crate::clock::Clock;
use crate::domain::DirectoryStats;
use crate::error::Error;
use crate::quarantine::Quarantine;
use crate::report::{DirectoryReport, RunReport, SnapshotOutcome};
use crate::snapshot::{SnapshotStore, changes, differs};
use crate::walk::Walker;
use config::Config;
use futures::future::join_all;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct Services {
    pub analyzer: Arc<dyn Analyzer>,
    pub clock: Arc<dyn Clock>,
}

/// Scans one monitored directory from traversal to snapshot retention.
pub struct DirectoryWorker {
    config: Arc<Config>,
    services: Services,
    runtime: Handle,
    cancel: CancellationToken,
}

impl DirectoryWorker {
    pub fn new(
        config: Arc<Config>,
        services: Services,
        runtime: Handle,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            services,
            runtime,
            cancel,
        }
    }

    /// Capture `root`, analyze and quarantine suspicious entries, then leave
    /// exactly one snapshot of `root` in the output directory.
    ///
    /// Blocks the calling thread; run it where [`AnalysisWorker::analyze`]
    /// may block.
    pub fn run_scan(&self, root: &Path) -> Result<DirectoryReport, Error> {
        let mut walker = Walker::new(root, self.config.scan.sort_entries)?;
        let root = walker.root().to_path_buf();
        let name = monitored_name(&root).ok_or_else(|| Error::SnapshotName { path: root.clone() })?;
        let output_dir = prepare_dir(&self.config.scan.output_dir)?;
        let isolation_dir = prepare_dir(&self.config.scan.isolation_dir)?;
        info!(root = %root.display(), %name, "scan started");

        let analysis = AnalysisWorker::new(
            Arc::clone(&self.services.analyzer),
            self.config.analysis.timeout,
            self.runtime.clone(),
            self.cancel.clone(),
        );
        let quarantine = Quarantine::new(&isolation_dir);
        let evaluator = RiskEvaluator::new(&analysis, &quarantine);

        let mut stats = DirectoryStats::default();
        let mut entries = Vec::new();
        loop {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let Some(entry) = walker.next() else {
                break;
            };
            if entry.is_directory && (entry.path == output_dir || entry.path == isolation_dir) {
                debug!(path = %entry.path.display(), "not descending into scanner-owned directory");
                walker.skip_current_dir();
            }
            if let RiskOutcome::Quarantined(_) = evaluator.evaluate(&entry, &mut stats) {
                walker.skip_current_dir();
            }
            entries.push(entry);
        }
        stats.entries = entries.len();
        stats.skipped = walker.skipped();

        let store = SnapshotStore::new(output_dir, Arc::clone(&self.services.clock));
        let current = store.persist(&name, &entries)?;
        let prior = store.find_most_recent_prior(&name, &current)?;

        let (outcome, kept) = match prior {
            None => (SnapshotOutcome::Initial, current),
            Some(prior) => match differs(&prior, &current, self.config.snapshot.chunk_size) {
                Ok(false) => (SnapshotOutcome::Unchanged, prior),
                Ok(true) => {
                    let details = match store.load(&prior) {
                        Ok(previous) => Some(changes(&previous, &entries)),
                        Err(err) => {
                            warn!(%err, "previous snapshot unreadable, no change details");
                            None
                        }
                    };
                    (SnapshotOutcome::Changed { changes: details }, current)
                }
                Err(err) => {
                    warn!(%err, "snapshot comparison failed, keeping previous snapshot");
                    let reason = err.to_string();
                    (SnapshotOutcome::ComparisonFailed { reason }, prior)
                }
            },
        };
        store.retain(&kept)?;

        info!(
            %name,
            snapshot = %kept.path.display(),
            outcome = outcome.label(),
            entries = stats.entries,
            suspicious = stats.suspicious,
            quarantined = stats.quarantined,
            "scan finished"
        );

        Ok(DirectoryReport {
            name,
            root,
            snapshot: kept.path,
            outcome,
            stats,
        })
    }
}

/// Runs one [`DirectoryWorker`] per monitored directory in parallel.
pub struct ScanOrchestrator {
    config: Arc<Config>,
    services: Services,
    cancel: CancellationToken,
}

impl ScanOrchestrator {
    pub fn new(config: Config, services: Services) -> Self {
        Self {
            config: Arc::new(config),
            services,
            cancel: CancellationToken::new(),
        }
    }

    /// Cancelling the token stops every worker at its next entry and kills a
    /// running analyzer.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Scan all `roots` concurrently and wait for every worker. A failing
    /// root never affects the others.
    pub async fn run(&self, roots: &[PathBuf]) -> RunReport {
        let runtime = Handle::current();
        let mut claimed = HashSet::new();
        let mut tasks = Vec::with_capacity(roots.len());

        for root in roots {
            // Workers of two roots with the same base name would delete each
            // other's snapshots.
            let duplicate = resolved_name(root)
                .filter(|name| !claimed.insert(name.clone()))
                .map(|name| Error::DuplicateName {
                    path: root.clone(),
                    name,
                });

            let worker = DirectoryWorker::new(
                Arc::clone(&self.config),
                self.services.clone(),
                runtime.clone(),
                self.cancel.clone(),
            );
            let root = root.clone();

            tasks.push(async move {
                if let Some(err) = duplicate {
                    return (root, Err(err));
                }
                let scan_root = root.clone();
                let result = tokio::task::spawn_blocking(move || worker.run_scan(&scan_root))
                    .await
                    .unwrap_or_else(|err| Err(Error::WorkerPanicked(err.to_string())));
                (root, result)
            });
        }

        let directories = join_all(tasks).await;
        for (root, result) in &directories {
            if let Err(err) = result {
                warn!(root = %root.display(), %err, "directory scan failed");
            }
        }
        RunReport { directories }
    }
}

fn monitored_name(root: &Path) -> Option<String> {
    Some(root.file_name()?.to_string_lossy().into_owned())
}

fn resolved_name(root: &Path) -> Option<String> {
    let root = std::fs::canonicalize(root).ok()?;
    monitored_name(&root)
}

fn prepare_dir(path: &Path) -> Result<PathBuf, Error> {
    let create_error = |source| Error::CreateDir {
        path: path.to_path_buf(),
        source,
    };
    std::fs::create_dir_all(path).map_err(create_error)?;
    std::fs::canonicalize(path).map_err(create_error)
}
