//! Domain model of the weekly school timetable.

mod board;
mod group;
mod session;
mod subject;
mod teacher;

pub use board::{
    AssignmentMatrix, Board, CellAssignment, SlotPos, PERIODS_PER_DAY, WEEKDAYS,
};
pub use group::{GroupIndexMap, GroupIndexMaps, GroupKey};
pub use session::{FixedSlot, ReductionSession, Session, SubjectSession};
pub use subject::{ElectiveBlock, Stage, Subject};
pub use teacher::{Availability, Teacher};
