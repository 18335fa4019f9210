//! Core types for the Horarium timetable engine.
//!
//! This crate carries everything the engine, its configuration and its
//! callers share:
//!
//! - the domain model: subjects, teachers, sessions, course groups and
//!   the assignment matrices they are placed into
//! - the integer [`Score`] with its per-factor [`ScoreBreakdown`]
//! - the [`EngineError`] taxonomy of the generation search
//! - the [`PersistenceGateway`] and [`Supervisor`] seams toward the
//!   surrounding system

pub mod domain;
pub mod error;
pub mod gateway;
pub mod score;
pub mod timetable;

pub use domain::{
    AssignmentMatrix, Availability, Board, CellAssignment, ElectiveBlock, FixedSlot,
    GroupIndexMap, GroupIndexMaps, GroupKey, ReductionSession, Session, SlotPos, Stage, Subject,
    SubjectSession, Teacher, PERIODS_PER_DAY, WEEKDAYS,
};
pub use error::{EngineError, Result};
pub use gateway::{PersistenceGateway, SearchDirective, Supervisor};
pub use score::{Score, ScoreBreakdown};
pub use timetable::Timetable;
