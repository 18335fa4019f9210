//! In-memory test doubles for the engine's integration seams.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use horarium_core::{
    EngineError, GroupKey, PersistenceGateway, Score, SearchDirective, Subject, Supervisor,
    Timetable,
};

/// One timetable handed to [`MemoryGateway::save_timetable`].
#[derive(Debug, Clone)]
pub struct SavedTimetable {
    pub timetable: Timetable,
    pub score: Score,
    pub note: String,
}

/// A [`PersistenceGateway`] backed by plain collections.
///
/// Groups and subjects are registered up front; saved timetables are
/// collected for later inspection.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    subjects: Mutex<Vec<Subject>>,
    groups: Mutex<HashMap<(GroupKey, bool), usize>>,
    saved: Mutex<Vec<SavedTimetable>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        MemoryGateway::default()
    }

    /// Registers the column block index of a group.
    pub fn register_group(&self, group: GroupKey, morning: bool, index: usize) {
        self.groups.lock().unwrap().insert((group, morning), index);
    }

    /// Registers a subject for elective sibling lookups.
    pub fn register_subject(&self, subject: Subject) {
        self.subjects.lock().unwrap().push(subject);
    }

    pub fn saved(&self) -> Vec<SavedTimetable> {
        self.saved.lock().unwrap().clone()
    }

    pub fn saved_count(&self) -> usize {
        self.saved.lock().unwrap().len()
    }

    pub fn last_saved(&self) -> Option<SavedTimetable> {
        self.saved.lock().unwrap().last().cloned()
    }
}

impl PersistenceGateway for MemoryGateway {
    fn save_timetable(&self, timetable: &Timetable, score: Score, note: &str) {
        self.saved.lock().unwrap().push(SavedTimetable {
            timetable: timetable.clone(),
            score,
            note: note.to_string(),
        });
    }

    fn elective_siblings(&self, subject: &Subject) -> Vec<Subject> {
        let Some(block) = subject.elective_block() else {
            return Vec::new();
        };
        self.subjects
            .lock()
            .unwrap()
            .iter()
            .filter(|candidate| candidate.in_block(block) && *candidate != subject)
            .cloned()
            .collect()
    }

    fn group_index(&self, group: &GroupKey, morning: bool) -> Option<usize> {
        self.groups
            .lock()
            .unwrap()
            .get(&(group.clone(), morning))
            .copied()
    }
}

/// A [`Supervisor`] that records every callback and aborts the search
/// after a fixed number of fruitless rounds.
#[derive(Debug)]
pub struct RecordingSupervisor {
    max_rounds: u32,
    no_solution_calls: AtomicU32,
    solutions_seen: AtomicU32,
    fatal_errors: Mutex<Vec<String>>,
}

impl RecordingSupervisor {
    /// Aborts once `max_rounds` rounds have run without a solution.
    pub fn abort_after(max_rounds: u32) -> Self {
        RecordingSupervisor {
            max_rounds,
            no_solution_calls: AtomicU32::new(0),
            solutions_seen: AtomicU32::new(0),
            fatal_errors: Mutex::new(Vec::new()),
        }
    }

    /// Restarts forever; only safe for requests known to be solvable.
    pub fn never_abort() -> Self {
        Self::abort_after(u32::MAX)
    }

    pub fn no_solution_calls(&self) -> u32 {
        self.no_solution_calls.load(Ordering::SeqCst)
    }

    pub fn solutions_seen(&self) -> u32 {
        self.solutions_seen.load(Ordering::SeqCst)
    }

    pub fn fatal_errors(&self) -> Vec<String> {
        self.fatal_errors.lock().unwrap().clone()
    }
}

impl Supervisor for RecordingSupervisor {
    fn on_no_solution_found(&self, rounds: u32) -> SearchDirective {
        self.no_solution_calls.fetch_add(1, Ordering::SeqCst);
        if rounds >= self.max_rounds {
            SearchDirective::Abort
        } else {
            SearchDirective::Restart
        }
    }

    fn on_fatal_error(&self, error: &EngineError) {
        self.fatal_errors.lock().unwrap().push(error.to_string());
    }

    fn on_solution(&self, _timetable: &Timetable) {
        self.solutions_seen.fetch_add(1, Ordering::SeqCst);
    }
}
