use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::path::PathBuf;
use std::time::Duration;

pub const MIN_TIMEOUT: Duration = Duration::from_secs(1);
pub const MAX_TIMEOUT: Duration = Duration::from_secs(3600);

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Analysis {
    /// External program deciding whether a suspicious entry is malicious.
    /// It is run as `program [args...] <path>`; exit status 0 means safe,
    /// any other status means unsafe.
    pub program: PathBuf,

    /// Extra arguments placed before the entry path.
    pub args: Vec<String>,

    /// Upper bound for a single analyzer run (clamped to 1..=3600).
    /// **Measured in seconds**.
    ///
    /// ## Note
    ///
    /// A run that exceeds it is killed and its entry is reported as an
    /// analysis error. The entry is never treated as safe or quarantined.
    #[serde_as(as = "serde_with::DurationSeconds")]
    pub timeout: Duration,
}

impl Default for Analysis {
    fn default() -> Self {
        Self {
            program: PathBuf::from("verify_for_malicious.sh"),
            args: Vec::new(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl Analysis {
    pub fn clamp(mut self) -> Self {
        self.timeout = self.timeout.clamp(MIN_TIMEOUT, MAX_TIMEOUT);
        self
    }
}
