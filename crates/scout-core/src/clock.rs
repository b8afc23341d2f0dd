//! Process-wide time source and stable contributor identity (C1).
//!
//! Design Note (spec §9): prefer explicit context passing over global
//! singletons. `Clock` is a trait object threaded into each component at
//! construction rather than a `static` — this keeps scoring, budgeting, and
//! the workflow tracker deterministic and unit-testable.

use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};
use std::sync::Arc;

/// Supplies the current time. Swappable for a fixed clock in tests so that
/// bucket-rollover and cooldown-window behavior (spec §8 property 1) can be
/// exercised deterministically.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Real wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that returns a fixed, externally-advanceable instant. Used by
/// tests that need to cross bucket boundaries deterministically.
#[derive(Debug, Clone)]
pub struct FixedClock {
    inner: Arc<std::sync::Mutex<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            inner: Arc::new(std::sync::Mutex::new(at)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.inner.lock().expect("fixed clock poisoned");
        *guard += by;
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.inner.lock().expect("fixed clock poisoned") = at;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.inner.lock().expect("fixed clock poisoned")
    }
}

/// Truncate `at` to the start of the bucket of kind `kind` that contains it.
/// Bucket identity is computed purely from the timestamp, so a restart or a
/// wall-clock jump always lands on the same or a later bucket — never an
/// earlier one, and never a partial reset (spec §4.4, testable property 1).
pub fn bucket_start(at: DateTime<Utc>, kind: super::types::BucketKind) -> DateTime<Utc> {
    use super::types::BucketKind::*;
    match kind {
        Hour => at
            .date_naive()
            .and_hms_opt(at.hour(), 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive))
            .unwrap_or(at),
        Day => at
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive))
            .unwrap_or(at),
        Week => {
            let days_since_monday = at.weekday().num_days_from_monday();
            let monday = at.date_naive() - Duration::days(days_since_monday as i64);
            monday
                .and_hms_opt(0, 0, 0)
                .map(|naive| Utc.from_utc_datetime(&naive))
                .unwrap_or(at)
        }
    }
}

/// Stable identity of the contributor this process acts on behalf of.
/// Read once at startup from config/env; never changes during a run.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ContributorIdentity {
    pub login: String,
}

impl ContributorIdentity {
    pub fn new(login: impl Into<String>) -> Self {
        Self { login: login.into() }
    }
}
