//! A small named-counter registry used for the per-cycle KPI snapshot
//! (spec §11.2: `status`/`stats`/`limits`). Simplified from
//! `at-telemetry::metrics::Counter` — no label sets, just a name and an
//! atomic value, since the daemon only needs coarse per-cycle tallies.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct CounterRegistry {
    counters: DashMap<&'static str, AtomicU64>,
}

impl CounterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn incr(&self, name: &'static str) {
        self.incr_by(name, 1);
    }

    pub fn incr_by(&self, name: &'static str, delta: u64) {
        self.counters
            .entry(name)
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(delta, Ordering::Relaxed);
    }

    pub fn get(&self, name: &'static str) -> u64 {
        self.counters.get(name).map(|c| c.load(Ordering::Relaxed)).unwrap_or(0)
    }

    /// Snapshot every counter registered so far, sorted by name for stable
    /// CLI/log output.
    pub fn snapshot(&self) -> Vec<(String, u64)> {
        let mut out: Vec<(String, u64)> =
            self.counters.iter().map(|e| (e.key().to_string(), e.value().load(Ordering::Relaxed))).collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incr_accumulates() {
        let reg = CounterRegistry::new();
        reg.incr("issues_scored");
        reg.incr("issues_scored");
        reg.incr_by("issues_scored", 3);
        assert_eq!(reg.get("issues_scored"), 5);
    }

    #[test]
    fn unknown_counter_is_zero() {
        let reg = CounterRegistry::new();
        assert_eq!(reg.get("nope"), 0);
    }

    #[test]
    fn snapshot_is_sorted() {
        let reg = CounterRegistry::new();
        reg.incr("zeta");
        reg.incr("alpha");
        let snap = reg.snapshot();
        assert_eq!(snap[0].0, "alpha");
        assert_eq!(snap[1].0, "zeta");
    }
}
