//! Sessions: the unit of placement in the search.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::group::GroupKey;
use super::subject::{ElectiveBlock, Subject};
use super::teacher::Teacher;

/// A pre-fixed weekday, and optionally period, for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedSlot {
    /// 0-based weekday, 0 = Monday.
    pub weekday: usize,
    /// 0-based period within the day. `None` fixes the weekday only.
    pub period: Option<usize>,
}

impl FixedSlot {
    /// Fixes the weekday and leaves the period free.
    pub fn day(weekday: usize) -> Self {
        FixedSlot {
            weekday,
            period: None,
        }
    }

    /// Fixes both weekday and period.
    pub fn at(weekday: usize, period: usize) -> Self {
        FixedSlot {
            weekday,
            period: Some(period),
        }
    }

    /// Whether a matrix position satisfies this restriction. The matrix
    /// day is reduced to its weekday before comparing.
    pub fn admits(&self, day: usize, period: usize, weekdays: usize) -> bool {
        if day % weekdays != self.weekday {
            return false;
        }
        match self.period {
            Some(fixed_period) => period == fixed_period,
            None => true,
        }
    }
}

/// One required weekly hour of a subject, taught by a teacher.
///
/// Subject and teacher data are shared between the many branch clones of
/// a search, so both sit behind an [`Arc`].
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectSession {
    subject: Arc<Subject>,
    teacher: Arc<Teacher>,
    morning: bool,
    fixed: Option<FixedSlot>,
}

impl SubjectSession {
    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn teacher(&self) -> &Teacher {
        &self.teacher
    }
}

/// One weekly reduction hour a teacher owes to a course group, such as
/// tutoring or coordination time, with no subject attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ReductionSession {
    teacher: Arc<Teacher>,
    group: GroupKey,
    morning: bool,
    fixed: Option<FixedSlot>,
}

impl ReductionSession {
    pub fn teacher(&self) -> &Teacher {
        &self.teacher
    }

    pub fn group(&self) -> &GroupKey {
        &self.group
    }
}

/// A session awaiting a day and period assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum Session {
    Subject(SubjectSession),
    Reduction(ReductionSession),
}

impl Session {
    pub fn subject_session(subject: Arc<Subject>, teacher: Arc<Teacher>, morning: bool) -> Self {
        Session::Subject(SubjectSession {
            subject,
            teacher,
            morning,
            fixed: None,
        })
    }

    pub fn reduction(teacher: Arc<Teacher>, group: GroupKey, morning: bool) -> Self {
        Session::Reduction(ReductionSession {
            teacher,
            group,
            morning,
            fixed: None,
        })
    }

    /// Attaches a fixed day/period restriction.
    pub fn with_fixed(mut self, slot: FixedSlot) -> Self {
        match &mut self {
            Session::Subject(session) => session.fixed = Some(slot),
            Session::Reduction(session) => session.fixed = Some(slot),
        }
        self
    }

    pub fn teacher(&self) -> &Teacher {
        match self {
            Session::Subject(session) => &session.teacher,
            Session::Reduction(session) => &session.teacher,
        }
    }

    pub fn is_morning(&self) -> bool {
        match self {
            Session::Subject(session) => session.morning,
            Session::Reduction(session) => session.morning,
        }
    }

    /// Course group the session belongs to.
    pub fn group(&self) -> &GroupKey {
        match self {
            Session::Subject(session) => session.subject.group(),
            Session::Reduction(session) => &session.group,
        }
    }

    /// The taught subject, or `None` for reduction hours.
    pub fn subject(&self) -> Option<&Subject> {
        match self {
            Session::Subject(session) => Some(&session.subject),
            Session::Reduction(_) => None,
        }
    }

    pub fn fixed(&self) -> Option<FixedSlot> {
        match self {
            Session::Subject(session) => session.fixed,
            Session::Reduction(session) => session.fixed,
        }
    }

    pub fn elective_block(&self) -> Option<&ElectiveBlock> {
        self.subject().and_then(Subject::elective_block)
    }

    pub fn is_vocational(&self) -> bool {
        self.subject().is_some_and(Subject::is_vocational)
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Session::Subject(session) => {
                write!(f, "{} by {}", session.subject, session.teacher.email())
            }
            Session::Reduction(session) => {
                write!(f, "reduction for {} by {}", session.group, session.teacher.email())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::subject::Stage;

    fn session() -> Session {
        let subject = Arc::new(Subject::new(
            "History",
            GroupKey::new("2º ESO B"),
            3,
            Stage::EsoBachillerato,
        ));
        let teacher = Arc::new(Teacher::new("h@school.es", "Helena"));
        Session::subject_session(subject, teacher, true)
    }

    #[test]
    fn test_subject_session_accessors() {
        let session = session();
        assert_eq!(session.group(), &GroupKey::new("2º ESO B"));
        assert!(session.is_morning());
        assert!(session.subject().is_some());
        assert!(session.fixed().is_none());
        assert!(!session.is_vocational());
        assert!(session.elective_block().is_none());
    }

    #[test]
    fn test_reduction_session_has_no_subject() {
        let teacher = Arc::new(Teacher::new("t@school.es", "Tomás"));
        let session = Session::reduction(teacher, GroupKey::new("1º ESO A"), true);
        assert!(session.subject().is_none());
        assert_eq!(session.group(), &GroupKey::new("1º ESO A"));
        assert!(!session.is_vocational());
    }

    #[test]
    fn test_fixed_slot_attachment() {
        let fixed = session().with_fixed(FixedSlot::at(2, 4));
        assert_eq!(fixed.fixed(), Some(FixedSlot::at(2, 4)));
    }

    #[test]
    fn test_fixed_slot_admission() {
        let wednesday = FixedSlot::day(2);
        assert!(wednesday.admits(2, 0, 5));
        assert!(wednesday.admits(7, 3, 5));
        assert!(!wednesday.admits(3, 0, 5));

        let wednesday_fourth = FixedSlot::at(2, 4);
        assert!(wednesday_fourth.admits(7, 4, 5));
        assert!(!wednesday_fourth.admits(7, 3, 5));
    }
}
