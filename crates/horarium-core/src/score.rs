//! Integer score assigned to candidate timetables.

use std::fmt;
use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A single aggregated score for a candidate timetable.
///
/// Higher is better. Scores are totally ordered so that competing
/// candidates from parallel search branches can be compared directly.
///
/// # Examples
///
/// ```
/// use horarium_core::Score;
///
/// let a = Score::of(120);
/// let b = Score::of(90);
/// assert!(a > b);
/// assert_eq!((a - b).value(), 30);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Score {
    value: i64,
}

impl Score {
    /// A score of zero.
    pub const ZERO: Score = Score { value: 0 };

    /// Creates a score with the given value.
    pub const fn of(value: i64) -> Self {
        Score { value }
    }

    /// Returns the raw score value.
    pub const fn value(&self) -> i64 {
        self.value
    }
}

impl Add for Score {
    type Output = Score;

    fn add(self, rhs: Score) -> Score {
        Score::of(self.value + rhs.value)
    }
}

impl Sub for Score {
    type Output = Score;

    fn sub(self, rhs: Score) -> Score {
        Score::of(self.value - rhs.value)
    }
}

impl Neg for Score {
    type Output = Score;

    fn neg(self) -> Score {
        Score::of(-self.value)
    }
}

impl From<i64> for Score {
    fn from(value: i64) -> Self {
        Score::of(value)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl fmt::Debug for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Score({})", self.value)
    }
}

/// Per-factor decomposition of a timetable score.
///
/// Persisted alongside the timetable so that operators can see why one
/// candidate beat another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Number of sessions committed to a cell.
    pub placed_sessions: u32,
    /// Number of back-to-back busy period pairs per teacher per weekday.
    pub consecutive_pairs: u32,
    /// Number of idle periods strictly between a teacher's first and last
    /// busy period of a weekday.
    pub teacher_gaps: u32,
    /// The weighted total of the factors above.
    pub total: Score,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_ordering() {
        assert!(Score::of(10) > Score::of(5));
        assert!(Score::of(-3) < Score::ZERO);
        assert_eq!(Score::of(7), Score::of(7));
    }

    #[test]
    fn test_score_arithmetic() {
        assert_eq!(Score::of(4) + Score::of(6), Score::of(10));
        assert_eq!(Score::of(4) - Score::of(6), Score::of(-2));
        assert_eq!(-Score::of(9), Score::of(-9));
    }

    #[test]
    fn test_score_display() {
        assert_eq!(Score::of(42).to_string(), "42");
        assert_eq!(format!("{:?}", Score::of(-1)), "Score(-1)");
    }

    #[test]
    fn test_score_default_is_zero() {
        assert_eq!(Score::default(), Score::ZERO);
    }
}
