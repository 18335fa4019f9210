//! The session catalog: every session the week requires, grouped into
//! priority buckets.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use horarium_core::{
    EngineError, FixedSlot, GroupKey, Result, Session, Subject, Teacher, PERIODS_PER_DAY,
    WEEKDAYS,
};

/// Priority bucket a session is filed into, in ascending priority.
///
/// Selection always drains the highest-priority non-empty bucket, so
/// the most constrained sessions are placed while the board is still
/// mostly free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BucketKind {
    /// No restriction of any kind.
    Unrestricted,
    /// Member of an elective block, placed together with its siblings.
    Elective,
    /// Held by a teacher with an availability restriction.
    Conciliation,
    /// Carries a pre-fixed day or day/period.
    FixedRestriction,
}

impl BucketKind {
    const ALL: [BucketKind; 4] = [
        BucketKind::Unrestricted,
        BucketKind::Elective,
        BucketKind::Conciliation,
        BucketKind::FixedRestriction,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BucketKind::Unrestricted => "unrestricted",
            BucketKind::Elective => "elective",
            BucketKind::Conciliation => "conciliation",
            BucketKind::FixedRestriction => "fixed",
        }
    }
}

/// One priority bucket of pending sessions.
#[derive(Debug, Clone)]
pub struct Bucket {
    kind: BucketKind,
    sessions: Vec<Session>,
}

impl Bucket {
    pub fn kind(&self) -> BucketKind {
        self.kind
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }
}

/// The pending sessions of one search branch.
///
/// Holds only non-empty buckets, in ascending priority. The active
/// bucket is the last one; it is drained completely before a lower
/// priority bucket becomes active.
#[derive(Debug, Clone)]
pub struct SessionBuckets {
    buckets: Vec<Bucket>,
}

impl SessionBuckets {
    fn new(sessions_by_kind: [Vec<Session>; 4]) -> Self {
        let buckets = BucketKind::ALL
            .into_iter()
            .zip(sessions_by_kind)
            .filter(|(_, sessions)| !sessions.is_empty())
            .map(|(kind, sessions)| Bucket { kind, sessions })
            .collect();
        SessionBuckets { buckets }
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of pending sessions across all buckets.
    pub fn pending(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.sessions.len()).sum()
    }

    /// The bucket selection currently draws from.
    pub fn active(&self) -> Option<&Bucket> {
        self.buckets.last()
    }

    /// Removes the session at `index` from the active bucket, dropping
    /// the bucket once it empties.
    pub fn take_active(&mut self, index: usize) -> Option<Session> {
        let bucket = self.buckets.last_mut()?;
        if index >= bucket.sessions.len() {
            return None;
        }
        let session = bucket.sessions.swap_remove(index);
        if bucket.sessions.is_empty() {
            self.buckets.pop();
        }
        Some(session)
    }
}

/// Builder of the week's session inventory.
///
/// Teaching assignments and reductions are expanded into one session
/// per weekly hour and classified into priority buckets. A branch of
/// the search starts from a [`SessionBuckets`] snapshot and consumes
/// it; the catalog itself stays untouched, so every round restarts
/// from the full inventory.
#[derive(Debug, Default)]
pub struct SessionCatalog {
    sessions_by_kind: [Vec<Session>; 4],
    teachers: HashMap<String, Arc<Teacher>>,
    subjects: HashSet<Subject>,
}

impl SessionCatalog {
    pub fn new() -> Self {
        SessionCatalog::default()
    }

    /// Expands one teaching assignment into its weekly sessions.
    ///
    /// `fixed` pins the first `fixed.len()` sessions to the given
    /// day/period restrictions; the remaining sessions stay free.
    pub fn add_assignment(
        &mut self,
        subject: Subject,
        teacher: Teacher,
        morning: bool,
        fixed: &[FixedSlot],
    ) -> Result<()> {
        if subject.weekly_hours() == 0 {
            return Err(EngineError::InvalidCatalog(format!(
                "subject '{subject}' has no weekly hours"
            )));
        }
        if fixed.len() > subject.weekly_hours() as usize {
            return Err(EngineError::TooManyRestrictions {
                subject: subject.name().to_string(),
                fixed: fixed.len(),
                weekly_hours: subject.weekly_hours() as usize,
            });
        }
        for slot in fixed {
            Self::check_slot(slot)?;
        }
        if !self.subjects.insert(subject.clone()) {
            return Err(EngineError::InvalidCatalog(format!(
                "duplicate teaching assignment for '{subject}'"
            )));
        }

        let teacher = self.intern_teacher(teacher)?;
        let subject = Arc::new(subject);
        for hour in 0..subject.weekly_hours() as usize {
            let mut session = Session::subject_session(subject.clone(), teacher.clone(), morning);
            if let Some(slot) = fixed.get(hour) {
                session = session.with_fixed(*slot);
            }
            self.file(session);
        }
        Ok(())
    }

    /// Expands a teacher's weekly reduction hours toward a course group.
    pub fn add_reduction(
        &mut self,
        teacher: Teacher,
        group: GroupKey,
        morning: bool,
        hours: u8,
    ) -> Result<()> {
        if hours == 0 {
            return Err(EngineError::InvalidCatalog(format!(
                "reduction for {} by {} has no hours",
                group,
                teacher.email()
            )));
        }
        let teacher = self.intern_teacher(teacher)?;
        for _ in 0..hours {
            self.file(Session::reduction(teacher.clone(), group.clone(), morning));
        }
        Ok(())
    }

    fn file(&mut self, session: Session) {
        let kind = Self::classify(&session);
        self.sessions_by_kind[kind as usize].push(session);
    }

    /// First matching restriction wins: a fixed slot dominates an
    /// availability restriction, which dominates elective membership.
    fn classify(session: &Session) -> BucketKind {
        if session.fixed().is_some() {
            BucketKind::FixedRestriction
        } else if session.teacher().availability().is_some() {
            BucketKind::Conciliation
        } else if session.elective_block().is_some() {
            BucketKind::Elective
        } else {
            BucketKind::Unrestricted
        }
    }

    fn check_slot(slot: &FixedSlot) -> Result<()> {
        if slot.weekday >= WEEKDAYS {
            return Err(EngineError::InvalidCatalog(format!(
                "fixed weekday {} out of range",
                slot.weekday
            )));
        }
        if let Some(period) = slot.period {
            if period >= PERIODS_PER_DAY {
                return Err(EngineError::InvalidCatalog(format!(
                    "fixed period {period} out of range"
                )));
            }
        }
        Ok(())
    }

    /// One teacher record per email; re-declaring a teacher with a
    /// different name or availability is a catalog inconsistency.
    fn intern_teacher(&mut self, teacher: Teacher) -> Result<Arc<Teacher>> {
        if let Some(existing) = self.teachers.get(teacher.email()) {
            if existing.name() != teacher.name()
                || existing.availability() != teacher.availability()
            {
                return Err(EngineError::InvalidCatalog(format!(
                    "teacher {} declared twice with different data",
                    teacher.email()
                )));
            }
            return Ok(existing.clone());
        }
        let teacher = Arc::new(teacher);
        self.teachers
            .insert(teacher.email().to_string(), teacher.clone());
        Ok(teacher)
    }

    pub fn session_count(&self) -> usize {
        self.sessions_by_kind.iter().map(Vec::len).sum()
    }

    pub fn bucket_len(&self, kind: BucketKind) -> usize {
        self.sessions_by_kind[kind as usize].len()
    }

    /// All sessions of the catalog, in bucket order.
    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions_by_kind.iter().flatten()
    }

    /// A fresh copy of the full inventory for one search round.
    pub fn snapshot(&self) -> SessionBuckets {
        SessionBuckets::new(self.sessions_by_kind.clone())
    }
}
