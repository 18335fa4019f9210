//! Deterministic scoring of candidate boards.

use std::collections::HashMap;

use horarium_config::ScoreWeights;
use horarium_core::{AssignmentMatrix, Board, Score, ScoreBreakdown, PERIODS_PER_DAY};

/// Scores a board from three factors:
///
/// - placed sessions reward coverage (and rank failure diagnostics by
///   how far they got)
/// - consecutive busy period pairs per teacher per weekday reward
///   compact teacher days
/// - idle periods strictly between a teacher's first and last busy
///   period of a weekday penalize fragmented ones
///
/// Teacher occupancy is collapsed to calendar weekdays, so sessions in
/// different group blocks of the same matrix count toward the same day.
#[derive(Debug, Clone)]
pub struct Scorer {
    weights: ScoreWeights,
}

impl Scorer {
    pub fn new(weights: ScoreWeights) -> Self {
        Scorer { weights }
    }

    pub fn score(&self, board: &Board) -> (Score, ScoreBreakdown) {
        let morning = matrix_metrics(&board.morning);
        let evening = matrix_metrics(&board.evening);

        let placed = morning.placed + evening.placed;
        let pairs = morning.pairs + evening.pairs;
        let gaps = morning.gaps + evening.gaps;

        let total = Score::of(
            i64::from(placed) * self.weights.placed_session
                + i64::from(pairs) * self.weights.consecutive_pair
                - i64::from(gaps) * self.weights.teacher_gap,
        );
        let breakdown = ScoreBreakdown {
            placed_sessions: placed,
            consecutive_pairs: pairs,
            teacher_gaps: gaps,
            total,
        };
        (total, breakdown)
    }
}

struct MatrixMetrics {
    placed: u32,
    pairs: u32,
    gaps: u32,
}

fn matrix_metrics(matrix: &AssignmentMatrix) -> MatrixMetrics {
    let mut occupancy: HashMap<(&str, usize), [bool; PERIODS_PER_DAY]> = HashMap::new();
    for (pos, cell) in matrix.iter_cells() {
        for session in cell.sessions() {
            let busy = occupancy
                .entry((session.teacher().email(), pos.weekday()))
                .or_insert([false; PERIODS_PER_DAY]);
            busy[pos.period] = true;
        }
    }

    let mut pairs = 0;
    let mut gaps = 0;
    for busy in occupancy.values() {
        pairs += busy.windows(2).filter(|pair| pair[0] && pair[1]).count() as u32;
        let first = busy.iter().position(|taken| *taken);
        let last = busy.iter().rposition(|taken| *taken);
        if let (Some(first), Some(last)) = (first, last) {
            gaps += busy[first..=last].iter().filter(|taken| !**taken).count() as u32;
        }
    }

    MatrixMetrics {
        placed: matrix.placed_sessions() as u32,
        pairs,
        gaps,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use horarium_core::{GroupKey, Session, SlotPos, Stage, Subject, Teacher};

    use super::*;

    fn scorer() -> Scorer {
        Scorer::new(ScoreWeights::default())
    }

    fn place(board: &mut Board, day: usize, period: usize, name: &str, email: &str) {
        let session = Session::subject_session(
            Arc::new(Subject::new(
                name,
                GroupKey::new("1º ESO A"),
                3,
                Stage::EsoBachillerato,
            )),
            Arc::new(Teacher::new(email, email)),
            true,
        );
        board
            .morning
            .place(SlotPos::new(day, period), session)
            .unwrap();
    }

    #[test]
    fn test_empty_board_scores_zero() {
        let board = Board::new(1, 1);
        let (score, breakdown) = scorer().score(&board);
        assert_eq!(score, Score::ZERO);
        assert_eq!(breakdown.placed_sessions, 0);
        assert_eq!(breakdown.total, Score::ZERO);
    }

    #[test]
    fn test_compact_day_beats_fragmented_day() {
        // periods 2 and 3 on the same day: one pair, no gap
        let mut compact = Board::new(1, 0);
        place(&mut compact, 0, 2, "Maths", "m@s.es");
        place(&mut compact, 0, 3, "History", "m@s.es");

        // periods 1 and 4: no pair, two gap periods
        let mut fragmented = Board::new(1, 0);
        place(&mut fragmented, 0, 1, "Maths", "m@s.es");
        place(&mut fragmented, 0, 4, "History", "m@s.es");

        let (compact_score, compact_breakdown) = scorer().score(&compact);
        let (fragmented_score, fragmented_breakdown) = scorer().score(&fragmented);

        assert_eq!(compact_breakdown.consecutive_pairs, 1);
        assert_eq!(compact_breakdown.teacher_gaps, 0);
        assert_eq!(compact_score, Score::of(2 * 10 + 2));

        assert_eq!(fragmented_breakdown.consecutive_pairs, 0);
        assert_eq!(fragmented_breakdown.teacher_gaps, 2);
        assert_eq!(fragmented_score, Score::of(2 * 10 - 2 * 3));

        assert!(compact_score > fragmented_score);
    }

    #[test]
    fn test_occupancy_merges_group_blocks_by_weekday() {
        // same teacher, same weekday, adjacent periods in two different
        // group blocks: still one consecutive pair
        let mut board = Board::new(2, 0);
        place(&mut board, 0, 2, "Maths", "m@s.es");
        let session = Session::subject_session(
            Arc::new(Subject::new(
                "Maths",
                GroupKey::new("1º ESO B"),
                3,
                Stage::EsoBachillerato,
            )),
            Arc::new(Teacher::new("m@s.es", "m@s.es")),
            true,
        );
        board.morning.place(SlotPos::new(5, 3), session).unwrap();

        let (_, breakdown) = scorer().score(&board);
        assert_eq!(breakdown.consecutive_pairs, 1);
        assert_eq!(breakdown.teacher_gaps, 0);
    }

    #[test]
    fn test_distinct_teachers_do_not_interact() {
        let mut board = Board::new(1, 0);
        place(&mut board, 0, 0, "Maths", "m@s.es");
        place(&mut board, 0, 5, "History", "h@s.es");

        let (_, breakdown) = scorer().score(&board);
        assert_eq!(breakdown.consecutive_pairs, 0);
        assert_eq!(breakdown.teacher_gaps, 0);
        assert_eq!(breakdown.placed_sessions, 2);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let mut board = Board::new(1, 1);
        place(&mut board, 1, 1, "Maths", "m@s.es");
        place(&mut board, 1, 2, "History", "m@s.es");
        place(&mut board, 3, 5, "Biology", "b@s.es");

        let (first, _) = scorer().score(&board);
        let (second, _) = scorer().score(&board);
        assert_eq!(first, second);
    }
}
