//! Time source abstraction.
//!
//! All date arithmetic in the engine (past-date checks, submission
//! timestamps) goes through [`Clock`] so tests can pin time.

use chrono::{DateTime, NaiveDate, Utc};

/// Abstracts time operations for testability
pub trait Clock: Send + Sync {
    /// Current instant in UTC
    fn now(&self) -> DateTime<Utc>;

    /// Calendar day of [`Clock::now`] in UTC
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Production clock backed by the operating system
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
