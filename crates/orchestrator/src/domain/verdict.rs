#![forbid(unsafe_code)]

use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The analyzer exited with status 0.
    Safe,
    /// The analyzer exited with a nonzero status.
    Unsafe { status: i32 },
    /// The analyzer produced no status at all. Never treated as safe.
    AnalysisError { reason: String },
}

impl Verdict {
    pub fn from_status(status: i32) -> Self {
        if status == 0 {
            Self::Safe
        } else {
            Self::Unsafe { status }
        }
    }

    pub fn from_error(err: &Error) -> Self {
        Self::AnalysisError {
            reason: err.to_string(),
        }
    }

    pub fn is_unsafe(&self) -> bool {
        matches!(self, Self::Unsafe { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn only_zero_is_safe() {
        assert_eq!(Verdict::from_status(0), Verdict::Safe);
        assert_eq!(Verdict::from_status(1), Verdict::Unsafe { status: 1 });
        assert_eq!(Verdict::from_status(-1), Verdict::Unsafe { status: -1 });
    }

    #[test]
    fn errors_are_neither_safe_nor_unsafe() {
        let err = Error::IsolationProtocol {
            path: PathBuf::from("/tmp/x"),
        };
        let verdict = Verdict::from_error(&err);
        assert!(!verdict.is_unsafe());
        assert_ne!(verdict, Verdict::Safe);
    }
}
