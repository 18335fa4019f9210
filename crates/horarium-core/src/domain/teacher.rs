//! Teachers and their availability restrictions.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::board::PERIODS_PER_DAY;

/// Weekly availability restriction attached to a teacher.
///
/// Restrictions only apply to morning-schedule sessions; evening sessions
/// are never filtered by them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// Arrives after the second period: the first two periods of a day
    /// are unusable.
    ArrivesAfterSecond,
    /// Leaves before the fifth period ends the day: the last period of a
    /// day is unusable.
    LeavesBeforeFifth,
}

impl Availability {
    /// Whether a 0-based period is usable under this restriction.
    pub fn allows(&self, period: usize) -> bool {
        match self {
            Availability::ArrivesAfterSecond => period >= 2,
            Availability::LeavesBeforeFifth => period < PERIODS_PER_DAY - 1,
        }
    }
}

/// A teacher, identified by email address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    email: String,
    name: String,
    availability: Option<Availability>,
}

impl Teacher {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Teacher {
            email: email.into(),
            name: name.into(),
            availability: None,
        }
    }

    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = Some(availability);
        self
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn availability(&self) -> Option<Availability> {
        self.availability
    }

    /// Whether the teacher can hold a morning session at the given period.
    pub fn allows_period(&self, period: usize) -> bool {
        match self.availability {
            Some(availability) => availability.allows(period),
            None => true,
        }
    }
}

impl PartialEq for Teacher {
    fn eq(&self, other: &Self) -> bool {
        self.email == other.email
    }
}

impl Eq for Teacher {}

impl Hash for Teacher {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.email.hash(state);
    }
}

impl fmt::Display for Teacher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_late_arrival_blocks_first_two_periods() {
        let availability = Availability::ArrivesAfterSecond;
        assert!(!availability.allows(0));
        assert!(!availability.allows(1));
        for period in 2..PERIODS_PER_DAY {
            assert!(availability.allows(period));
        }
    }

    #[test]
    fn test_early_leave_blocks_last_period() {
        let availability = Availability::LeavesBeforeFifth;
        for period in 0..PERIODS_PER_DAY - 1 {
            assert!(availability.allows(period));
        }
        assert!(!availability.allows(PERIODS_PER_DAY - 1));
    }

    #[test]
    fn test_unrestricted_teacher_allows_everything() {
        let teacher = Teacher::new("a@school.es", "Ana");
        for period in 0..PERIODS_PER_DAY {
            assert!(teacher.allows_period(period));
        }
    }

    #[test]
    fn test_identity_is_email() {
        let a = Teacher::new("a@school.es", "Ana");
        let b = Teacher::new("a@school.es", "Ana María")
            .with_availability(Availability::LeavesBeforeFifth);
        let c = Teacher::new("c@school.es", "Ana");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
