//! Candidate slot pipeline: from a day window to the feasible positions
//! of one session.

use rand::rngs::StdRng;
use rand::Rng;

use horarium_core::{
    AssignmentMatrix, EngineError, Result, Session, SlotPos, PERIODS_PER_DAY, WEEKDAYS,
};

/// The matrix days a placement attempt currently considers.
///
/// A window starts as the 5-day column block of the session's own course
/// group and widens block by block, wrapping around the matrix, until
/// every block has been brought in.
#[derive(Debug, Clone)]
pub struct SlotWindow {
    days: Vec<usize>,
    start_block: usize,
    blocks_used: usize,
    block_count: usize,
}

impl SlotWindow {
    /// Opens a window over the block that owns `start_day`.
    pub fn starting_at(start_day: usize, block_count: usize) -> Self {
        let start_block = start_day / WEEKDAYS;
        let mut window = SlotWindow {
            days: Vec::with_capacity(WEEKDAYS),
            start_block,
            blocks_used: 0,
            block_count,
        };
        window.push_block(start_block);
        window
    }

    fn push_block(&mut self, block: usize) {
        let first = block * WEEKDAYS;
        self.days.extend(first..first + WEEKDAYS);
        self.blocks_used += 1;
    }

    /// Brings the next column block into the window. Returns `false`
    /// once every block is already included.
    pub fn widen(&mut self) -> bool {
        if self.blocks_used >= self.block_count {
            return false;
        }
        let next = (self.start_block + self.blocks_used) % self.block_count;
        self.push_block(next);
        true
    }

    /// Days of the window, in inclusion order.
    pub fn days(&self) -> &[usize] {
        &self.days
    }
}

/// Feasible positions left after the pipeline, drawn from at random.
#[derive(Debug, Clone)]
pub struct CandidateSlots {
    slots: Vec<SlotPos>,
}

impl CandidateSlots {
    fn cross_product(window: &SlotWindow) -> Self {
        let mut slots = Vec::with_capacity(window.days().len() * PERIODS_PER_DAY);
        for &day in window.days() {
            for period in 0..PERIODS_PER_DAY {
                slots.push(SlotPos::new(day, period));
            }
        }
        CandidateSlots { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, pos: SlotPos) -> bool {
        self.slots.contains(&pos)
    }

    pub fn as_slice(&self) -> &[SlotPos] {
        &self.slots
    }

    pub fn retain(&mut self, keep: impl FnMut(&SlotPos) -> bool) {
        self.slots.retain(keep);
    }

    fn narrow_to_day(&mut self, day: usize) {
        self.slots.retain(|pos| pos.day == day);
    }

    /// Removes and returns one candidate uniformly at random.
    pub fn draw(&mut self, rng: &mut StdRng) -> Result<SlotPos> {
        if self.slots.is_empty() {
            return Err(EngineError::NoSlotAvailable);
        }
        let index = rng.random_range(0..self.slots.len());
        Ok(self.slots.swap_remove(index))
    }
}

/// Runs the filter pipeline for one session over one day window.
///
/// The surviving set may be empty, in which case the first draw reports
/// [`EngineError::NoSlotAvailable`] and the caller widens the window.
/// Only the vocational contiguity filter fails outright: when no day of
/// the window can take another session of the subject, it reports
/// [`EngineError::NoDaysAvailable`].
pub fn candidate_slots(
    session: &Session,
    window: &SlotWindow,
    matrix: &AssignmentMatrix,
) -> Result<CandidateSlots> {
    let mut slots = CandidateSlots::cross_product(window);
    filter_fixed(session, &mut slots);
    filter_availability(session, &mut slots);
    filter_elective(session, matrix, &mut slots);
    filter_vocational(session, window, matrix, &mut slots)?;
    filter_daily_cap(session, matrix, &mut slots);
    filter_teacher_conflict(session, matrix, &mut slots);
    filter_occupancy(session, matrix, &mut slots);
    Ok(slots)
}

/// Keeps only positions matching the session's fixed day/period, if any.
fn filter_fixed(session: &Session, slots: &mut CandidateSlots) {
    if let Some(fixed) = session.fixed() {
        slots.retain(|pos| fixed.admits(pos.day, pos.period, WEEKDAYS));
    }
}

/// Drops the periods a morning teacher's availability rules out.
fn filter_availability(session: &Session, slots: &mut CandidateSlots) {
    if !session.is_morning() {
        return;
    }
    let Some(availability) = session.teacher().availability() else {
        return;
    };
    slots.retain(|pos| availability.allows(pos.period));
}

/// Narrows to the cell of a sibling elective session the subject has not
/// joined yet, when one exists anywhere in the matrix.
fn filter_elective(session: &Session, matrix: &AssignmentMatrix, slots: &mut CandidateSlots) {
    let Some(subject) = session.subject() else {
        return;
    };
    let Some(block) = subject.elective_block() else {
        return;
    };
    if let Some(target) = matrix.find_elective_cell(block, subject) {
        slots.retain(|pos| *pos == target);
    }
}

/// Keeps vocational sessions of one subject together.
///
/// Days are scanned in window order. A day already holding the subject
/// below its cap narrows the candidates to the open slots adjacent to
/// the existing run; an elective cell the subject may still join counts
/// as open. With no such day, the first day that is still free of the
/// subject and offers any candidate is taken whole. A window with no
/// usable day at all ends the branch.
fn filter_vocational(
    session: &Session,
    window: &SlotWindow,
    matrix: &AssignmentMatrix,
    slots: &mut CandidateSlots,
) -> Result<()> {
    let Some(subject) = session.subject() else {
        return Ok(());
    };
    if !subject.is_vocational() {
        return Ok(());
    }

    let open = |day: usize, period: usize| match matrix.cell(day, period) {
        None => true,
        Some(cell) => cell.joinable_by(subject),
    };
    for &day in window.days() {
        let periods = matrix.subject_periods_on_day(day, subject);
        if periods.is_empty() || periods.len() >= subject.max_daily_sessions() {
            continue;
        }
        let mut adjacent = Vec::new();
        for &period in &periods {
            if period > 0 {
                let candidate = SlotPos::new(day, period - 1);
                if open(day, period - 1) && slots.contains(candidate) {
                    adjacent.push(candidate);
                }
            }
            if period + 1 < PERIODS_PER_DAY {
                let candidate = SlotPos::new(day, period + 1);
                if open(day, period + 1) && slots.contains(candidate) {
                    adjacent.push(candidate);
                }
            }
        }
        if !adjacent.is_empty() {
            slots.retain(|pos| adjacent.contains(pos));
            return Ok(());
        }
    }
    for &day in window.days() {
        if !matrix.subject_periods_on_day(day, subject).is_empty() {
            continue;
        }
        if slots.as_slice().iter().any(|pos| pos.day == day) {
            slots.narrow_to_day(day);
            return Ok(());
        }
    }
    Err(EngineError::NoDaysAvailable)
}

/// Drops days that already hold the subject's daily maximum.
fn filter_daily_cap(session: &Session, matrix: &AssignmentMatrix, slots: &mut CandidateSlots) {
    let Some(subject) = session.subject() else {
        return;
    };
    let cap = subject.max_daily_sessions();
    slots.retain(|pos| matrix.subject_count_on_day(pos.day, subject) < cap);
}

/// Drops positions whose weekday/period already has the teacher busy in
/// any group's column block.
fn filter_teacher_conflict(
    session: &Session,
    matrix: &AssignmentMatrix,
    slots: &mut CandidateSlots,
) {
    let teacher = session.teacher();
    slots.retain(|pos| !matrix.teacher_busy(pos.weekday(), pos.period, teacher));
}

/// Drops occupied cells the session cannot join.
fn filter_occupancy(session: &Session, matrix: &AssignmentMatrix, slots: &mut CandidateSlots) {
    slots.retain(|pos| match matrix.cell(pos.day, pos.period) {
        None => true,
        Some(cell) => session
            .subject()
            .is_some_and(|subject| cell.joinable_by(subject)),
    });
}
