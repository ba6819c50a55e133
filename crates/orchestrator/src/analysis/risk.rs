#![forbid(unsafe_code)]

use crate::analysis::AnalysisWorker;
use crate::domain::{DirectoryStats, EntryDescriptor, Permissions, Verdict};
use crate::quarantine::{Quarantine, QuarantineRecord};
use tracing::{info, warn};

/// Zero access bits is the anomaly signature worth a content analysis.
pub fn is_suspicious(permissions: Permissions) -> bool {
    permissions.is_empty()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RiskOutcome {
    /// Some access bit is set; the analyzer was not involved.
    Ignored,
    /// Analyzed and left in place: safe, analysis error, or a failed move.
    Analyzed(Verdict),
    Quarantined(QuarantineRecord),
}

/// Gates the analyzer on the permission check and quarantines what it flags.
pub struct RiskEvaluator<'a> {
    worker: &'a AnalysisWorker,
    quarantine: &'a Quarantine,
}

impl<'a> RiskEvaluator<'a> {
    pub fn new(worker: &'a AnalysisWorker, quarantine: &'a Quarantine) -> Self {
        Self { worker, quarantine }
    }

    /// Blocks until the analysis of a suspicious entry, if any, is done.
    pub fn evaluate(&self, entry: &EntryDescriptor, stats: &mut DirectoryStats) -> RiskOutcome {
        if !is_suspicious(entry.permissions) {
            return RiskOutcome::Ignored;
        }

        stats.suspicious += 1;
        info!(path = %entry.path.display(), "entry has no access bits, analyzing");

        let verdict = self.worker.analyze(&entry.path);
        match &verdict {
            Verdict::Safe => {
                info!(path = %entry.path.display(), "analyzer reported entry as safe");
            }
            Verdict::AnalysisError { reason } => {
                stats.analysis_failures += 1;
                warn!(
                    path = %entry.path.display(),
                    %reason,
                    "analysis failed, entry left in place"
                );
            }
            Verdict::Unsafe { status } => {
                info!(path = %entry.path.display(), status, "analyzer flagged entry");
                match self.quarantine.isolate(&entry.path) {
                    Ok(record) => {
                        stats.quarantined += 1;
                        return RiskOutcome::Quarantined(record);
                    }
                    Err(err) => {
                        warn!(%err, "quarantine failed, entry left without access bits");
                    }
                }
            }
        }
        RiskOutcome::Analyzed(verdict)
    }
}
