//! Error types shared across the timetable engine.

use thiserror::Error;

/// Main error type for timetable generation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A subject declares more pre-fixed slots than it has weekly hours.
    #[error("subject '{subject}' declares {fixed} fixed slots but only {weekly_hours} weekly hours")]
    TooManyRestrictions {
        subject: String,
        fixed: usize,
        weekly_hours: usize,
    },

    /// The current day window holds no feasible slot for a session.
    /// Recovered by widening the window; never escapes the slot assigner.
    #[error("no feasible slot in the current day window")]
    NoSlotAvailable,

    /// No day anywhere in the timetable can hold the session. Terminates
    /// the search branch that raised it.
    #[error("no day available anywhere in the timetable")]
    NoDaysAvailable,

    /// The catalog input data is malformed or inconsistent.
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    /// An internal invariant was violated.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias using [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;
