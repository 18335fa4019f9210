//! Integration seams between the engine and its surrounding system.

use std::fmt::Debug;

use crate::domain::{GroupKey, Subject};
use crate::error::EngineError;
use crate::score::Score;
use crate::timetable::Timetable;

/// Outbound persistence operations the engine relies on.
///
/// The engine itself keeps no storage: finished solutions, failure
/// diagnostics and catalog lookups all go through this trait.
pub trait PersistenceGateway: Send + Sync + Debug {
    /// Persists a finished or diagnostic timetable with its score.
    fn save_timetable(&self, timetable: &Timetable, score: Score, note: &str);

    /// Subjects sharing an elective block with the given subject,
    /// excluding the subject itself.
    fn elective_siblings(&self, subject: &Subject) -> Vec<Subject>;

    /// Column block index of a course group in the morning or evening
    /// matrix.
    fn group_index(&self, group: &GroupKey, morning: bool) -> Option<usize>;
}

/// What to do when a search round ends with no qualifying solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirective {
    /// Start a fresh round from an empty board.
    Restart,
    /// Stop searching and settle for the best failure diagnostic.
    Abort,
}

/// Inbound control surface of the process supervising a generation run.
///
/// All methods have neutral defaults so implementors only override the
/// decisions they care about.
pub trait Supervisor: Send + Sync + Debug {
    /// Called after each round that found no qualifying solution.
    /// `rounds` is the number of rounds completed so far.
    fn on_no_solution_found(&self, rounds: u32) -> SearchDirective {
        let _ = rounds;
        SearchDirective::Restart
    }

    /// Called when a run aborts on malformed catalog data or an internal
    /// invariant violation.
    fn on_fatal_error(&self, _error: &EngineError) {}

    /// Called once when a qualifying solution has been retained.
    fn on_solution(&self, _timetable: &Timetable) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Indifferent;

    impl Supervisor for Indifferent {}

    #[test]
    fn test_default_directive_is_restart() {
        let supervisor = Indifferent;
        assert_eq!(supervisor.on_no_solution_found(3), SearchDirective::Restart);
    }
}
