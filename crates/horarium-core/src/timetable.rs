//! Scored candidate timetables.

use std::cmp::Ordering;

use crate::domain::{AssignmentMatrix, Board};
use crate::score::{Score, ScoreBreakdown};

/// A candidate timetable together with its score.
///
/// Produced for completed boards and for the partial boards left behind
/// by failed search branches. Candidates are ordered by score alone.
#[derive(Debug, Clone)]
pub struct Timetable {
    board: Board,
    score: Score,
    breakdown: ScoreBreakdown,
}

impl Timetable {
    pub fn new(board: Board, score: Score, breakdown: ScoreBreakdown) -> Self {
        Timetable {
            board,
            score,
            breakdown,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn breakdown(&self) -> &ScoreBreakdown {
        &self.breakdown
    }

    pub fn morning(&self) -> &AssignmentMatrix {
        &self.board.morning
    }

    pub fn evening(&self) -> &AssignmentMatrix {
        &self.board.evening
    }

    pub fn placed_sessions(&self) -> usize {
        self.board.placed_sessions()
    }
}

impl PartialEq for Timetable {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score
    }
}

impl Eq for Timetable {}

impl PartialOrd for Timetable {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timetable {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score.cmp(&other.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timetable(score: i64) -> Timetable {
        Timetable::new(Board::new(1, 0), Score::of(score), ScoreBreakdown::default())
    }

    #[test]
    fn test_ordered_by_score_alone() {
        assert!(timetable(50) > timetable(35));
        assert_eq!(timetable(20), timetable(20));

        let mut candidates = vec![timetable(10), timetable(50), timetable(35)];
        candidates.sort();
        let scores: Vec<i64> = candidates.iter().map(|t| t.score().value()).collect();
        assert_eq!(scores, vec![10, 35, 50]);
    }
}
