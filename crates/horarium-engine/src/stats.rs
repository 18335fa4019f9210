//! Search statistics collected across rounds and worker threads.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Counters accumulated over one generation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundStats {
    /// Search rounds started, including the first.
    pub rounds: u32,
    /// Branches handed to the worker pool.
    pub branches_spawned: u64,
    /// Branches that placed every pending session.
    pub branches_completed: u64,
    /// Branches that ended on an unplaceable session.
    pub branches_failed: u64,
    /// Branches discarded because a solution already existed.
    pub branches_preempted: u64,
}

/// Thread-safe collector behind [`RoundStats`].
///
/// Counters are only ever incremented while a round is in flight and
/// read after it drains, so relaxed ordering is enough.
#[derive(Debug, Default)]
pub struct StatsCollector {
    rounds: AtomicU32,
    spawned: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    preempted: AtomicU64,
}

impl StatsCollector {
    pub fn new() -> Self {
        StatsCollector::default()
    }

    pub fn record_round(&self) {
        self.rounds.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_spawned(&self) {
        self.spawned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_preempted(&self) {
        self.preempted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn rounds(&self) -> u32 {
        self.rounds.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> RoundStats {
        RoundStats {
            rounds: self.rounds.load(Ordering::Relaxed),
            branches_spawned: self.spawned.load(Ordering::Relaxed),
            branches_completed: self.completed.load(Ordering::Relaxed),
            branches_failed: self.failed.load(Ordering::Relaxed),
            branches_preempted: self.preempted.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let stats = StatsCollector::new();
        stats.record_round();
        stats.record_round();
        stats.record_spawned();
        stats.record_completed();
        stats.record_failed();
        stats.record_failed();
        stats.record_preempted();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.rounds, 2);
        assert_eq!(snapshot.branches_spawned, 1);
        assert_eq!(snapshot.branches_completed, 1);
        assert_eq!(snapshot.branches_failed, 2);
        assert_eq!(snapshot.branches_preempted, 1);
    }

    #[test]
    fn test_empty_snapshot() {
        assert_eq!(StatsCollector::new().snapshot(), RoundStats::default());
    }
}
