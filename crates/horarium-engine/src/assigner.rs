//! Slot assignment: committing one session to the board.

use rand::rngs::StdRng;
use tracing::{debug, trace};

use horarium_core::{AssignmentMatrix, CellAssignment, EngineError, Result, Session, SlotPos};

use crate::slots::{candidate_slots, SlotWindow};

/// One committed session, with the cell it landed in.
///
/// The cell copy reflects the moment right after the placement; the
/// selector reads it to decide which session should follow.
#[derive(Debug, Clone)]
pub struct Placement {
    pub pos: SlotPos,
    pub session: Session,
    pub cell: CellAssignment,
}

/// Places the session into the matrix.
///
/// Runs the candidate pipeline over a window that starts at the
/// session's own group block, draws a slot at random and commits it.
/// An empty candidate set widens the window by the next group block;
/// when the whole matrix has been tried the session is unplaceable and
/// the branch ends with [`EngineError::NoDaysAvailable`].
pub fn assign(
    session: &Session,
    start_day: usize,
    matrix: &mut AssignmentMatrix,
    rng: &mut StdRng,
) -> Result<Placement> {
    let mut window = SlotWindow::starting_at(start_day, matrix.group_count());
    loop {
        let mut candidates = candidate_slots(session, &window, matrix)?;
        match candidates.draw(rng) {
            Ok(pos) => {
                matrix.place(pos, session.clone())?;
                let cell = matrix.cell(pos.day, pos.period).cloned().ok_or_else(|| {
                    EngineError::Internal(format!("placed cell at {pos} vanished"))
                })?;
                trace!(
                    event = "session_placed",
                    session = %session,
                    day = pos.day,
                    period = pos.period,
                );
                return Ok(Placement {
                    pos,
                    session: session.clone(),
                    cell,
                });
            }
            Err(EngineError::NoSlotAvailable) => {
                if !window.widen() {
                    debug!(event = "session_unplaceable", session = %session);
                    return Err(EngineError::NoDaysAvailable);
                }
                debug!(
                    event = "window_widened",
                    session = %session,
                    days = window.days().len(),
                );
            }
            Err(other) => return Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use horarium_core::{GroupKey, Stage, Subject, Teacher, PERIODS_PER_DAY, WEEKDAYS};
    use rand::SeedableRng;

    use super::*;

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    fn make_session(name: &str, group: &str, hours: u8) -> Session {
        Session::subject_session(
            Arc::new(Subject::new(name, GroupKey::new(group), hours, Stage::EsoBachillerato)),
            Arc::new(Teacher::new("t@s.es", "T")),
            true,
        )
    }

    // every filler gets its own teacher so only cell occupancy blocks
    fn fill_block(matrix: &mut AssignmentMatrix, block: usize) {
        for weekday in 0..WEEKDAYS {
            let day = block * WEEKDAYS + weekday;
            for period in 0..PERIODS_PER_DAY {
                let filler = Session::subject_session(
                    Arc::new(Subject::new(
                        format!("Filler {day}-{period}"),
                        GroupKey::new("1º ESO A"),
                        1,
                        Stage::EsoBachillerato,
                    )),
                    Arc::new(Teacher::new(format!("f{day}-{period}@s.es"), "F")),
                    true,
                );
                matrix.place(SlotPos::new(day, period), filler).unwrap();
            }
        }
    }

    #[test]
    fn test_assign_lands_in_own_block() {
        let mut matrix = AssignmentMatrix::new(2);
        let session = make_session("Maths", "1º ESO B", 3);
        let placement = assign(&session, 5, &mut matrix, &mut rng(1)).unwrap();
        assert!(placement.pos.day >= 5 && placement.pos.day < 10);
        assert_eq!(matrix.placed_sessions(), 1);
    }

    #[test]
    fn test_assign_widens_into_the_next_block() {
        let mut matrix = AssignmentMatrix::new(2);
        fill_block(&mut matrix, 0);

        let session = make_session("Maths", "1º ESO A", 3);
        let placement = assign(&session, 0, &mut matrix, &mut rng(2)).unwrap();
        assert!(placement.pos.day >= 5, "expected overflow into the second block");
    }

    #[test]
    fn test_assign_fails_once_every_block_is_tried() {
        let mut matrix = AssignmentMatrix::new(1);
        fill_block(&mut matrix, 0);

        let session = make_session("Maths", "1º ESO A", 3);
        let err = assign(&session, 0, &mut matrix, &mut rng(3)).unwrap_err();
        assert!(matches!(err, EngineError::NoDaysAvailable));
    }

    #[test]
    fn test_single_matching_slot_is_found() {
        let mut matrix = AssignmentMatrix::new(1);
        let pinned = make_session("Maths", "1º ESO A", 3)
            .with_fixed(horarium_core::FixedSlot::at(4, 5));
        let placement = assign(&pinned, 0, &mut matrix, &mut rng(4)).unwrap();
        assert_eq!(placement.pos, SlotPos::new(4, 5));
    }
}
