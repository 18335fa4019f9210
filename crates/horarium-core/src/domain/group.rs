//! Course groups and their matrix column blocks.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::board::WEEKDAYS;

/// Identity of a course group, e.g. `"1º ESO A"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupKey(String);

impl GroupKey {
    pub fn new(key: impl Into<String>) -> Self {
        GroupKey(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GroupKey {
    fn from(key: &str) -> Self {
        GroupKey::new(key)
    }
}

/// Maps each course group of one schedule to its column block index
/// inside the assignment matrix.
///
/// Block `i` owns matrix days `i * 5 .. i * 5 + 5`. Indices must be
/// dense: `0..group_count`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupIndexMap {
    indices: HashMap<GroupKey, usize>,
}

impl GroupIndexMap {
    pub fn new() -> Self {
        GroupIndexMap::default()
    }

    /// Builds a dense map from the iteration order of `groups`.
    pub fn from_groups<I>(groups: I) -> Self
    where
        I: IntoIterator<Item = GroupKey>,
    {
        let indices = groups
            .into_iter()
            .enumerate()
            .map(|(index, group)| (group, index))
            .collect();
        GroupIndexMap { indices }
    }

    pub fn insert(&mut self, group: GroupKey, index: usize) {
        self.indices.insert(group, index);
    }

    pub fn index_of(&self, group: &GroupKey) -> Option<usize> {
        self.indices.get(group).copied()
    }

    /// First matrix day of the group's column block.
    pub fn start_day(&self, group: &GroupKey) -> Option<usize> {
        self.index_of(group).map(|index| index * WEEKDAYS)
    }

    /// Number of column blocks the matrix must hold.
    pub fn group_count(&self) -> usize {
        self.indices.values().max().map_or(0, |max| max + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, usize)> {
        self.indices.iter().map(|(group, index)| (group, *index))
    }
}

/// Group-to-block maps for both schedules of the week.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupIndexMaps {
    pub morning: GroupIndexMap,
    pub evening: GroupIndexMap,
}

impl GroupIndexMaps {
    pub fn new(morning: GroupIndexMap, evening: GroupIndexMap) -> Self {
        GroupIndexMaps { morning, evening }
    }

    pub fn for_schedule(&self, morning: bool) -> &GroupIndexMap {
        if morning {
            &self.morning
        } else {
            &self.evening
        }
    }

    pub fn index_of(&self, group: &GroupKey, morning: bool) -> Option<usize> {
        self.for_schedule(morning).index_of(group)
    }

    pub fn start_day(&self, group: &GroupKey, morning: bool) -> Option<usize> {
        self.for_schedule(morning).start_day(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_map_from_groups() {
        let map = GroupIndexMap::from_groups(vec![
            GroupKey::new("1º ESO A"),
            GroupKey::new("1º ESO B"),
            GroupKey::new("2º ESO A"),
        ]);
        assert_eq!(map.group_count(), 3);
        assert_eq!(map.index_of(&GroupKey::new("1º ESO B")), Some(1));
        assert_eq!(map.start_day(&GroupKey::new("2º ESO A")), Some(10));
        assert_eq!(map.index_of(&GroupKey::new("3º ESO A")), None);
    }

    #[test]
    fn test_group_count_follows_highest_index() {
        let mut map = GroupIndexMap::new();
        assert_eq!(map.group_count(), 0);
        map.insert(GroupKey::new("FP1"), 2);
        assert_eq!(map.group_count(), 3);
    }

    #[test]
    fn test_schedule_selection() {
        let maps = GroupIndexMaps::new(
            GroupIndexMap::from_groups(vec![GroupKey::new("1º ESO A")]),
            GroupIndexMap::from_groups(vec![GroupKey::new("FP nocturno")]),
        );
        assert_eq!(maps.start_day(&GroupKey::new("1º ESO A"), true), Some(0));
        assert_eq!(maps.start_day(&GroupKey::new("1º ESO A"), false), None);
        assert_eq!(maps.start_day(&GroupKey::new("FP nocturno"), false), Some(0));
    }
}
