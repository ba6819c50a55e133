#![forbid(unsafe_code)]

mod analyzer;
mod risk;
mod worker;

pub use analyzer::{Analyzer, CommandAnalyzer};
pub use risk::{RiskEvaluator, RiskOutcome, is_suspicious};
pub use worker::{AnalysisWorker, GRANT_MODE, REVOKED_MODE};
