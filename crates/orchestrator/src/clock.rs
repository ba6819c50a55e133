#![forbid(unsafe_code)]

use chrono::{DateTime, Utc};

/// Source of the timestamps embedded in snapshot artifact names.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
