#![forbid(unsafe_code)]

pub mod analysis;
pub mod clock;
pub mod domain;
pub mod engine;
pub mod error;
pub mod quarantine;
pub mod report;
pub mod snapshot;
pub mod walk;

pub use analysis::{AnalysisWorker, Analyzer, CommandAnalyzer, RiskEvaluator, RiskOutcome};
pub use engine::{DirectoryWorker, ScanOrchestrator, Services};
pub use error::Error;
pub use quarantine::{Quarantine, QuarantineRecord};
pub use report::{DirectoryReport, RunReport, SnapshotOutcome};
pub use snapshot::{ChangeSet, SnapshotHandle, SnapshotStore};
pub use walk::Walker;

pub use clock::{Clock, SystemClock};
pub use domain::{DirectoryStats, EntryDescriptor, Permissions, Verdict};
