//! Subjects and their stage classification.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::group::GroupKey;

/// Educational stage a subject belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Compulsory secondary or Bachillerato. At most one session per day.
    EsoBachillerato,
    /// Vocational training module. Scheduled in contiguous runs, at most
    /// two sessions per day.
    Vocational,
}

impl Stage {
    /// Maximum number of sessions of one subject a single day may hold.
    pub fn max_daily_sessions(&self) -> usize {
        match self {
            Stage::EsoBachillerato => 1,
            Stage::Vocational => 2,
        }
    }
}

/// Identifier of an elective block whose member subjects run in parallel
/// and therefore share their timetable cells.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElectiveBlock(String);

impl ElectiveBlock {
    pub fn new(id: impl Into<String>) -> Self {
        ElectiveBlock(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElectiveBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A subject taught to one course group.
///
/// Identity is the `(name, group)` pair: the same subject name taught to
/// two groups is two distinct subjects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    name: String,
    group: GroupKey,
    weekly_hours: u8,
    stage: Stage,
    elective_block: Option<ElectiveBlock>,
}

impl Subject {
    pub fn new(
        name: impl Into<String>,
        group: GroupKey,
        weekly_hours: u8,
        stage: Stage,
    ) -> Self {
        Subject {
            name: name.into(),
            group,
            weekly_hours,
            stage,
            elective_block: None,
        }
    }

    /// Marks the subject as a member of an elective block.
    pub fn with_elective_block(mut self, block: ElectiveBlock) -> Self {
        self.elective_block = Some(block);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group(&self) -> &GroupKey {
        &self.group
    }

    pub fn weekly_hours(&self) -> u8 {
        self.weekly_hours
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn elective_block(&self) -> Option<&ElectiveBlock> {
        self.elective_block.as_ref()
    }

    pub fn is_vocational(&self) -> bool {
        self.stage == Stage::Vocational
    }

    pub fn max_daily_sessions(&self) -> usize {
        self.stage.max_daily_sessions()
    }

    pub fn in_block(&self, block: &ElectiveBlock) -> bool {
        self.elective_block.as_ref() == Some(block)
    }
}

impl PartialEq for Subject {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.group == other.group
    }
}

impl Eq for Subject {}

impl Hash for Subject {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.group.hash(state);
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maths(group: &str) -> Subject {
        Subject::new("Mathematics", GroupKey::new(group), 3, Stage::EsoBachillerato)
    }

    #[test]
    fn test_identity_is_name_and_group() {
        assert_eq!(maths("1º ESO A"), maths("1º ESO A"));
        assert_ne!(maths("1º ESO A"), maths("1º ESO B"));

        let renamed = Subject::new("Biology", GroupKey::new("1º ESO A"), 3, Stage::EsoBachillerato);
        assert_ne!(maths("1º ESO A"), renamed);
    }

    #[test]
    fn test_hours_do_not_affect_identity() {
        let short = Subject::new("Workshop", GroupKey::new("FP1"), 2, Stage::Vocational);
        let long = Subject::new("Workshop", GroupKey::new("FP1"), 9, Stage::Vocational);
        assert_eq!(short, long);
    }

    #[test]
    fn test_daily_session_cap_by_stage() {
        assert_eq!(maths("1º ESO A").max_daily_sessions(), 1);
        let workshop = Subject::new("Workshop", GroupKey::new("FP1"), 6, Stage::Vocational);
        assert_eq!(workshop.max_daily_sessions(), 2);
        assert!(workshop.is_vocational());
    }

    #[test]
    fn test_elective_block_membership() {
        let block = ElectiveBlock::new("optativas-1");
        let french = Subject::new("French", GroupKey::new("3º ESO A"), 2, Stage::EsoBachillerato)
            .with_elective_block(block.clone());
        assert!(french.in_block(&block));
        assert!(!french.in_block(&ElectiveBlock::new("optativas-2")));
        assert!(!maths("3º ESO A").in_block(&block));
    }
}
