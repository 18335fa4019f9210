//! Assignment matrices: the shared board the search writes into.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::session::Session;
use super::subject::{ElectiveBlock, Subject};
use super::teacher::Teacher;
use crate::error::{EngineError, Result};

/// Teaching days per week.
pub const WEEKDAYS: usize = 5;

/// Periods per teaching day.
pub const PERIODS_PER_DAY: usize = 6;

/// A concrete (day, period) position inside an assignment matrix.
///
/// `day` is a matrix day: weekday plus the 5-day offset of the course
/// group's column block. `day % 5` recovers the calendar weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotPos {
    pub day: usize,
    pub period: usize,
}

impl SlotPos {
    pub fn new(day: usize, period: usize) -> Self {
        SlotPos { day, period }
    }

    /// Calendar weekday of this position, 0 = Monday.
    pub fn weekday(&self) -> usize {
        self.day % WEEKDAYS
    }
}

impl fmt::Display for SlotPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "day {} period {}", self.day, self.period)
    }
}

/// Sessions committed to one matrix cell.
///
/// A cell normally holds exactly one session. Cells created by an
/// elective placement carry the elective marker and accept the sibling
/// subjects of the same block, one session per subject.
#[derive(Debug, Clone, PartialEq)]
pub struct CellAssignment {
    sessions: SmallVec<[Session; 2]>,
    elective: bool,
}

impl CellAssignment {
    fn new(session: Session) -> Self {
        let elective = session.elective_block().is_some();
        let mut sessions = SmallVec::new();
        sessions.push(session);
        CellAssignment { sessions, elective }
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn is_elective(&self) -> bool {
        self.elective
    }

    /// Elective block of the cell, taken from its first session.
    pub fn block(&self) -> Option<&ElectiveBlock> {
        self.sessions.first().and_then(Session::elective_block)
    }

    pub fn contains_subject(&self, subject: &Subject) -> bool {
        self.sessions
            .iter()
            .any(|session| session.subject() == Some(subject))
    }

    pub fn has_teacher(&self, teacher: &Teacher) -> bool {
        self.sessions.iter().any(|session| session.teacher() == teacher)
    }

    /// Whether a subject may join this cell: elective cells take one
    /// session of each sibling subject of the same block.
    pub fn joinable_by(&self, subject: &Subject) -> bool {
        self.elective
            && subject.elective_block().is_some()
            && self.block() == subject.elective_block()
            && !self.contains_subject(subject)
    }
}

/// One week of assignments for every course group of a schedule.
///
/// The grid is `(group_count * 5)` days by 6 periods: each group owns a
/// 5-day column block, so one matrix carries all groups of the morning
/// (or evening) schedule side by side.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentMatrix {
    group_count: usize,
    cells: Vec<Option<CellAssignment>>,
}

impl AssignmentMatrix {
    pub fn new(group_count: usize) -> Self {
        AssignmentMatrix {
            group_count,
            cells: vec![None; group_count * WEEKDAYS * PERIODS_PER_DAY],
        }
    }

    pub fn group_count(&self) -> usize {
        self.group_count
    }

    /// Number of matrix days across all column blocks.
    pub fn day_count(&self) -> usize {
        self.group_count * WEEKDAYS
    }

    fn index(&self, day: usize, period: usize) -> usize {
        day * PERIODS_PER_DAY + period
    }

    pub fn cell(&self, day: usize, period: usize) -> Option<&CellAssignment> {
        self.cells.get(self.index(day, period)).and_then(Option::as_ref)
    }

    pub fn is_free(&self, day: usize, period: usize) -> bool {
        self.cell(day, period).is_none()
    }

    /// Commits a session to a cell.
    ///
    /// An occupied cell only accepts the session if the cell is elective
    /// and the session's subject is a not-yet-present sibling of the
    /// cell's block. Any other collision is an internal error: the slot
    /// pipeline must never offer such a position.
    pub fn place(&mut self, pos: SlotPos, session: Session) -> Result<()> {
        if pos.day >= self.day_count() || pos.period >= PERIODS_PER_DAY {
            return Err(EngineError::Internal(format!(
                "placement at {pos} outside a {} x {} matrix",
                self.day_count(),
                PERIODS_PER_DAY,
            )));
        }
        let index = self.index(pos.day, pos.period);
        match &mut self.cells[index] {
            empty @ None => {
                *empty = Some(CellAssignment::new(session));
                Ok(())
            }
            Some(cell) => {
                let joinable = session
                    .subject()
                    .is_some_and(|subject| cell.joinable_by(subject));
                if !joinable {
                    return Err(EngineError::Internal(format!(
                        "cell at {pos} already occupied and not joinable by {session}"
                    )));
                }
                cell.sessions.push(session);
                Ok(())
            }
        }
    }

    pub fn sessions_on_day(&self, day: usize) -> impl Iterator<Item = &Session> {
        let start = self.index(day, 0);
        self.cells[start..start + PERIODS_PER_DAY]
            .iter()
            .flatten()
            .flat_map(|cell| cell.sessions.iter())
    }

    /// How many sessions of the subject the day already holds.
    pub fn subject_count_on_day(&self, day: usize, subject: &Subject) -> usize {
        self.sessions_on_day(day)
            .filter(|session| session.subject() == Some(subject))
            .count()
    }

    /// Periods of the day already holding the subject, in ascending order.
    pub fn subject_periods_on_day(&self, day: usize, subject: &Subject) -> SmallVec<[usize; 2]> {
        let mut periods = SmallVec::new();
        for period in 0..PERIODS_PER_DAY {
            if let Some(cell) = self.cell(day, period) {
                if cell.contains_subject(subject) {
                    periods.push(period);
                }
            }
        }
        periods
    }

    /// Whether the teacher already holds a session at this weekday and
    /// period in any group's column block of this matrix.
    pub fn teacher_busy(&self, weekday: usize, period: usize, teacher: &Teacher) -> bool {
        (0..self.group_count).any(|block| {
            let day = block * WEEKDAYS + weekday;
            self.cell(day, period)
                .is_some_and(|cell| cell.has_teacher(teacher))
        })
    }

    /// First cell of the block that the subject could still join.
    pub fn find_elective_cell(&self, block: &ElectiveBlock, subject: &Subject) -> Option<SlotPos> {
        self.iter_cells().find_map(|(pos, cell)| {
            if cell.is_elective() && cell.block() == Some(block) && cell.joinable_by(subject) {
                Some(pos)
            } else {
                None
            }
        })
    }

    /// Occupied cells with their positions, in day-major order.
    pub fn iter_cells(&self) -> impl Iterator<Item = (SlotPos, &CellAssignment)> {
        self.cells.iter().enumerate().filter_map(|(index, cell)| {
            cell.as_ref().map(|cell| {
                let pos = SlotPos::new(index / PERIODS_PER_DAY, index % PERIODS_PER_DAY);
                (pos, cell)
            })
        })
    }

    /// Total number of sessions committed to the matrix.
    pub fn placed_sessions(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .map(|cell| cell.sessions.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }
}

/// The pair of matrices one generation run writes into: one for the
/// morning schedule, one for the evening schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    pub morning: AssignmentMatrix,
    pub evening: AssignmentMatrix,
}

impl Board {
    pub fn new(morning_groups: usize, evening_groups: usize) -> Self {
        Board {
            morning: AssignmentMatrix::new(morning_groups),
            evening: AssignmentMatrix::new(evening_groups),
        }
    }

    pub fn matrix(&self, morning: bool) -> &AssignmentMatrix {
        if morning {
            &self.morning
        } else {
            &self.evening
        }
    }

    pub fn matrix_mut(&mut self, morning: bool) -> &mut AssignmentMatrix {
        if morning {
            &mut self.morning
        } else {
            &mut self.evening
        }
    }

    pub fn placed_sessions(&self) -> usize {
        self.morning.placed_sessions() + self.evening.placed_sessions()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::group::GroupKey;
    use crate::domain::subject::Stage;

    fn subject_session(name: &str, email: &str) -> Session {
        let subject = Arc::new(Subject::new(
            name,
            GroupKey::new("1º ESO A"),
            3,
            Stage::EsoBachillerato,
        ));
        let teacher = Arc::new(Teacher::new(email, email));
        Session::subject_session(subject, teacher, true)
    }

    fn elective_session(name: &str, email: &str, block: &str) -> Session {
        let subject = Arc::new(
            Subject::new(name, GroupKey::new("1º ESO A"), 2, Stage::EsoBachillerato)
                .with_elective_block(ElectiveBlock::new(block)),
        );
        let teacher = Arc::new(Teacher::new(email, email));
        Session::subject_session(subject, teacher, true)
    }

    #[test]
    fn test_place_in_free_cell() {
        let mut matrix = AssignmentMatrix::new(1);
        matrix
            .place(SlotPos::new(0, 0), subject_session("Maths", "m@school.es"))
            .unwrap();
        assert!(!matrix.is_free(0, 0));
        assert_eq!(matrix.placed_sessions(), 1);
        assert!(!matrix.cell(0, 0).unwrap().is_elective());
    }

    #[test]
    fn test_occupied_cell_rejects_plain_session() {
        let mut matrix = AssignmentMatrix::new(1);
        matrix
            .place(SlotPos::new(1, 2), subject_session("Maths", "m@school.es"))
            .unwrap();
        let err = matrix
            .place(SlotPos::new(1, 2), subject_session("History", "h@school.es"))
            .unwrap_err();
        assert!(matches!(err, EngineError::Internal(_)));
    }

    #[test]
    fn test_elective_cell_accepts_each_sibling_once() {
        let mut matrix = AssignmentMatrix::new(1);
        let pos = SlotPos::new(2, 3);
        matrix
            .place(pos, elective_session("French", "f@school.es", "opt-1"))
            .unwrap();
        matrix
            .place(pos, elective_session("Music", "mu@school.es", "opt-1"))
            .unwrap();

        let cell = matrix.cell(2, 3).unwrap();
        assert!(cell.is_elective());
        assert_eq!(cell.sessions().len(), 2);

        // one session per subject: a repeat of the same subject is refused
        let err = matrix
            .place(pos, elective_session("Music", "mu@school.es", "opt-1"))
            .unwrap_err();
        assert!(matches!(err, EngineError::Internal(_)));
    }

    #[test]
    fn test_elective_cell_rejects_other_block() {
        let mut matrix = AssignmentMatrix::new(1);
        let pos = SlotPos::new(0, 5);
        matrix
            .place(pos, elective_session("French", "f@school.es", "opt-1"))
            .unwrap();
        let err = matrix
            .place(pos, elective_session("Drama", "d@school.es", "opt-2"))
            .unwrap_err();
        assert!(matches!(err, EngineError::Internal(_)));
    }

    #[test]
    fn test_place_outside_matrix_is_rejected() {
        let mut matrix = AssignmentMatrix::new(1);
        let err = matrix
            .place(SlotPos::new(5, 0), subject_session("Maths", "m@school.es"))
            .unwrap_err();
        assert!(matches!(err, EngineError::Internal(_)));
    }

    #[test]
    fn test_teacher_busy_looks_across_group_blocks() {
        let mut matrix = AssignmentMatrix::new(2);
        // group block 0, Tuesday, period 2
        matrix
            .place(SlotPos::new(1, 2), subject_session("Maths", "m@school.es"))
            .unwrap();

        let teacher = Teacher::new("m@school.es", "m@school.es");
        assert!(matrix.teacher_busy(1, 2, &teacher));
        // the conflict is visible from the second block's Tuesday too
        assert!(matrix.cell(6, 2).is_none());
        assert!(matrix.teacher_busy(1, 2, &Teacher::new("m@school.es", "other name")));
        assert!(!matrix.teacher_busy(1, 3, &teacher));
        assert!(!matrix.teacher_busy(2, 2, &teacher));
    }

    #[test]
    fn test_subject_day_queries() {
        let mut matrix = AssignmentMatrix::new(1);
        let workshop = Arc::new(Subject::new(
            "Workshop",
            GroupKey::new("1º ESO A"),
            6,
            Stage::Vocational,
        ));
        let teacher = Arc::new(Teacher::new("w@school.es", "Wanda"));
        for period in [1, 2] {
            matrix
                .place(
                    SlotPos::new(3, period),
                    Session::subject_session(workshop.clone(), teacher.clone(), true),
                )
                .unwrap();
        }

        assert_eq!(matrix.subject_count_on_day(3, &workshop), 2);
        assert_eq!(matrix.subject_count_on_day(2, &workshop), 0);
        let periods = matrix.subject_periods_on_day(3, &workshop);
        assert_eq!(periods.as_slice(), &[1, 2]);
    }

    #[test]
    fn test_find_elective_cell_skips_cells_holding_the_subject() {
        let mut matrix = AssignmentMatrix::new(1);
        let pos = SlotPos::new(4, 1);
        matrix
            .place(pos, elective_session("French", "f@school.es", "opt-1"))
            .unwrap();

        let block = ElectiveBlock::new("opt-1");
        let music = Subject::new("Music", GroupKey::new("1º ESO A"), 2, Stage::EsoBachillerato)
            .with_elective_block(block.clone());
        let french = Subject::new("French", GroupKey::new("1º ESO A"), 2, Stage::EsoBachillerato)
            .with_elective_block(block.clone());

        assert_eq!(matrix.find_elective_cell(&block, &music), Some(pos));
        assert_eq!(matrix.find_elective_cell(&block, &french), None);
        assert_eq!(matrix.find_elective_cell(&ElectiveBlock::new("opt-2"), &music), None);
    }

    #[test]
    fn test_board_schedule_routing() {
        let mut board = Board::new(2, 1);
        assert_eq!(board.matrix(true).day_count(), 10);
        assert_eq!(board.matrix(false).day_count(), 5);

        board
            .matrix_mut(false)
            .place(SlotPos::new(0, 0), subject_session("Night class", "n@school.es"))
            .unwrap();
        assert_eq!(board.placed_sessions(), 1);
        assert!(board.matrix(true).is_empty());
    }
}
