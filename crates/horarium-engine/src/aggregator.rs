//! Aggregation of candidate timetables produced by concurrent branches.

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tracing::info;

use horarium_core::{Board, Score, Timetable};

use crate::scorer::Scorer;

// sentinel meaning "nothing retained yet"
const NO_SCORE: i64 = i64::MIN;
const NO_INDEX: usize = usize::MAX;

/// An append-only log of retained timetables with its current best.
///
/// The best score is an atomic so that branch workers can poll for
/// preemption without taking the lock; `fetch_max` keeps it monotone.
/// Entries and the best index are written under the lock, so the index
/// always points at the entry that carried the best score.
#[derive(Debug, Default)]
struct TimetableLog {
    entries: Mutex<Vec<Arc<Timetable>>>,
    best_score: AtomicI64,
    best_index: AtomicUsize,
}

impl TimetableLog {
    fn new() -> Self {
        TimetableLog {
            entries: Mutex::new(Vec::new()),
            best_score: AtomicI64::new(NO_SCORE),
            best_index: AtomicUsize::new(NO_INDEX),
        }
    }

    /// Retains the timetable if it beats both the threshold and the
    /// current best. Returns whether it was retained.
    fn record(&self, timetable: Arc<Timetable>, threshold: Score) -> bool {
        let score = timetable.score().value();
        if score <= threshold.value() {
            return false;
        }
        let mut entries = self.entries.lock().unwrap();
        let previous = self.best_score.fetch_max(score, Ordering::AcqRel);
        if previous >= score {
            return false;
        }
        entries.push(timetable);
        self.best_index.store(entries.len() - 1, Ordering::Release);
        true
    }

    fn best_score(&self) -> Option<Score> {
        match self.best_score.load(Ordering::Acquire) {
            NO_SCORE => None,
            score => Some(Score::of(score)),
        }
    }

    fn current(&self) -> Option<Arc<Timetable>> {
        let index = self.best_index.load(Ordering::Acquire);
        if index == NO_INDEX {
            return None;
        }
        let entries = self.entries.lock().unwrap();
        entries.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

/// Collects the boards finished or abandoned by search branches and
/// keeps the best complete solution and the best failure diagnostic.
///
/// Shared by every worker of a run and across its rounds. The best
/// solution only ever improves: a report can never replace a retained
/// solution with a worse one.
#[derive(Debug)]
pub struct SolutionAggregator {
    scorer: Scorer,
    min_solution: Score,
    min_failure: Score,
    solutions: TimetableLog,
    failures: TimetableLog,
}

impl SolutionAggregator {
    pub fn new(scorer: Scorer, min_solution: Score, min_failure: Score) -> Self {
        SolutionAggregator {
            scorer,
            min_solution,
            min_failure,
            solutions: TimetableLog::new(),
            failures: TimetableLog::new(),
        }
    }

    /// Scores a fully placed board and retains it when it qualifies.
    pub fn report_solution(&self, board: Board) -> Score {
        let (score, breakdown) = self.scorer.score(&board);
        let timetable = Arc::new(Timetable::new(board, score, breakdown));
        if self.solutions.record(timetable, self.min_solution) {
            info!(
                event = "new_best_solution",
                score = score.value(),
                placed = breakdown.placed_sessions,
            );
        }
        score
    }

    /// Scores the partial board of a failed branch and retains it as a
    /// diagnostic when it qualifies.
    pub fn report_failure(&self, board: Board) -> Score {
        let (score, breakdown) = self.scorer.score(&board);
        let timetable = Arc::new(Timetable::new(board, score, breakdown));
        if self.failures.record(timetable, self.min_failure) {
            info!(
                event = "new_best_failure",
                score = score.value(),
                placed = breakdown.placed_sessions,
            );
        }
        score
    }

    /// Lock-free preemption check polled by branch workers.
    pub fn has_solution(&self) -> bool {
        self.solutions.best_score().is_some()
    }

    pub fn best_solution_score(&self) -> Option<Score> {
        self.solutions.best_score()
    }

    pub fn best_failure_score(&self) -> Option<Score> {
        self.failures.best_score()
    }

    pub fn current_solution(&self) -> Option<Arc<Timetable>> {
        self.solutions.current()
    }

    pub fn current_failure(&self) -> Option<Arc<Timetable>> {
        self.failures.current()
    }

    pub fn solution_count(&self) -> usize {
        self.solutions.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use horarium_config::ScoreWeights;
    use horarium_core::{GroupKey, Session, SlotPos, Stage, Subject, Teacher};

    use super::*;

    // weight of 1 per placed session and nothing else, so a board with
    // n sessions scores exactly n
    fn counting_aggregator(min_solution: i64, min_failure: i64) -> SolutionAggregator {
        let weights = ScoreWeights {
            placed_session: 1,
            consecutive_pair: 0,
            teacher_gap: 0,
        };
        SolutionAggregator::new(
            Scorer::new(weights),
            Score::of(min_solution),
            Score::of(min_failure),
        )
    }

    fn board_with_sessions(count: usize) -> Board {
        let mut board = Board::new(2, 0);
        let mut placed = 0;
        'outer: for day in 0..board.morning.day_count() {
            for period in 0..6 {
                if placed == count {
                    break 'outer;
                }
                let session = Session::subject_session(
                    Arc::new(Subject::new(
                        format!("S{placed}"),
                        GroupKey::new("1º ESO A"),
                        1,
                        Stage::EsoBachillerato,
                    )),
                    Arc::new(Teacher::new(format!("t{placed}@s.es"), "T")),
                    true,
                );
                board
                    .morning
                    .place(SlotPos::new(day, period), session)
                    .unwrap();
                placed += 1;
            }
        }
        board
    }

    #[test]
    fn test_best_solution_is_monotone() {
        let aggregator = counting_aggregator(0, 0);
        for count in [10, 35, 20, 50, 45] {
            aggregator.report_solution(board_with_sessions(count));
        }
        assert_eq!(aggregator.best_solution_score(), Some(Score::of(50)));
        assert_eq!(
            aggregator.current_solution().unwrap().placed_sessions(),
            50
        );
    }

    #[test]
    fn test_threshold_gates_retention() {
        let aggregator = counting_aggregator(40, 0);
        assert_eq!(
            aggregator.report_solution(board_with_sessions(30)),
            Score::of(30)
        );
        assert!(!aggregator.has_solution());
        assert!(aggregator.current_solution().is_none());

        aggregator.report_solution(board_with_sessions(41));
        assert!(aggregator.has_solution());
        assert_eq!(aggregator.best_solution_score(), Some(Score::of(41)));
    }

    #[test]
    fn test_exact_threshold_does_not_qualify() {
        let aggregator = counting_aggregator(30, 0);
        aggregator.report_solution(board_with_sessions(30));
        assert!(!aggregator.has_solution());
    }

    #[test]
    fn test_failures_and_solutions_are_separate() {
        let aggregator = counting_aggregator(0, 0);
        aggregator.report_failure(board_with_sessions(12));
        assert!(!aggregator.has_solution());
        assert_eq!(aggregator.best_failure_score(), Some(Score::of(12)));

        aggregator.report_solution(board_with_sessions(8));
        assert_eq!(aggregator.best_solution_score(), Some(Score::of(8)));
        assert_eq!(aggregator.best_failure_score(), Some(Score::of(12)));
    }

    #[test]
    fn test_concurrent_reports_keep_the_best() {
        let aggregator = counting_aggregator(0, 0);
        thread::scope(|scope| {
            for count in [10, 35, 20, 50] {
                let aggregator = &aggregator;
                scope.spawn(move || {
                    aggregator.report_solution(board_with_sessions(count));
                });
            }
        });
        assert_eq!(aggregator.best_solution_score(), Some(Score::of(50)));
        let best = aggregator.current_solution().unwrap();
        assert_eq!(best.score(), Score::of(50));
        assert_eq!(best.placed_sessions(), 50);
    }
}
