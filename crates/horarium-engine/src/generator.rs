//! The timetable generator: rounds, the worker pool and the outside
//! world's entry point.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;

use crossbeam::channel::unbounded;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use horarium_config::GeneratorConfig;
use horarium_core::{
    Board, EngineError, FixedSlot, GroupIndexMaps, GroupKey, PersistenceGateway, Result, Score,
    SearchDirective, Subject, Supervisor, Teacher, Timetable,
};

use crate::aggregator::SolutionAggregator;
use crate::catalog::SessionCatalog;
use crate::scorer::Scorer;
use crate::search::{worker_loop, BranchState, OutstandingWork, SearchContext, WorkItem};
use crate::stats::{RoundStats, StatsCollector};

/// One teaching duty: a subject taught to its group by a teacher.
#[derive(Debug, Clone)]
pub struct TeachingAssignment {
    pub subject: Subject,
    pub teacher: Teacher,
    pub morning: bool,
}

/// Weekly reduction hours a teacher owes to a course group.
#[derive(Debug, Clone)]
pub struct ReductionAssignment {
    pub teacher: Teacher,
    pub group: GroupKey,
    pub morning: bool,
    pub hours: u8,
}

/// Pre-fixed day/period restrictions for one subject's sessions.
#[derive(Debug, Clone)]
pub struct FixedRule {
    pub subject: String,
    pub group: GroupKey,
    pub slots: Vec<FixedSlot>,
}

/// The full input of one generation run.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub assignments: Vec<TeachingAssignment>,
    pub reductions: Vec<ReductionAssignment>,
    pub fixed_rules: Vec<FixedRule>,
}

impl GenerationRequest {
    pub fn new() -> Self {
        GenerationRequest::default()
    }

    pub fn with_assignment(mut self, subject: Subject, teacher: Teacher, morning: bool) -> Self {
        self.assignments.push(TeachingAssignment {
            subject,
            teacher,
            morning,
        });
        self
    }

    pub fn with_reduction(
        mut self,
        teacher: Teacher,
        group: GroupKey,
        morning: bool,
        hours: u8,
    ) -> Self {
        self.reductions.push(ReductionAssignment {
            teacher,
            group,
            morning,
            hours,
        });
        self
    }

    pub fn with_fixed_rule(
        mut self,
        subject: impl Into<String>,
        group: GroupKey,
        slots: Vec<FixedSlot>,
    ) -> Self {
        self.fixed_rules.push(FixedRule {
            subject: subject.into(),
            group,
            slots,
        });
        self
    }
}

/// Externally visible state of a generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationStatus {
    Idle,
    InProgress { rounds: u32 },
    SolutionFound { score: Score },
    NoSolutionYet { rounds: u32 },
}

/// Everything a finished run hands back.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    /// Best qualifying solution, if any round produced one.
    pub solution: Option<Arc<Timetable>>,
    /// Best-scored partial board among the failed branches.
    pub best_failure: Option<Arc<Timetable>>,
    pub stats: RoundStats,
}

impl GenerationOutcome {
    pub fn is_solved(&self) -> bool {
        self.solution.is_some()
    }
}

/// Generates weekly timetables by randomized parallel search.
///
/// A run expands the request into a session catalog, then searches in
/// rounds: each round releases one root branch over an empty board into
/// the worker pool and waits for the pool to drain. Rounds repeat until
/// a qualifying solution appears or the supervisor aborts, at which
/// point the best failure diagnostic is persisted instead.
#[derive(Debug)]
pub struct TimetableGenerator {
    config: GeneratorConfig,
    gateway: Arc<dyn PersistenceGateway>,
    supervisor: Arc<dyn Supervisor>,
    status: Mutex<GenerationStatus>,
}

impl TimetableGenerator {
    pub fn new(
        config: GeneratorConfig,
        gateway: Arc<dyn PersistenceGateway>,
        supervisor: Arc<dyn Supervisor>,
    ) -> Self {
        TimetableGenerator {
            config,
            gateway,
            supervisor,
            status: Mutex::new(GenerationStatus::Idle),
        }
    }

    pub fn status(&self) -> GenerationStatus {
        self.status.lock().unwrap().clone()
    }

    fn set_status(&self, status: GenerationStatus) {
        *self.status.lock().unwrap() = status;
    }

    /// Runs one full generation for the request.
    ///
    /// Malformed input and internal invariant violations end the run
    /// with an error, after notifying the supervisor.
    pub fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutcome> {
        match self.try_generate(request) {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                self.supervisor.on_fatal_error(&err);
                self.set_status(GenerationStatus::Idle);
                Err(err)
            }
        }
    }

    fn try_generate(&self, request: &GenerationRequest) -> Result<GenerationOutcome> {
        let catalog = self.build_catalog(request)?;
        let groups = self.resolve_groups(&catalog)?;

        let workers = self.config.worker_threads.resolve().max(1);
        info!(
            event = "generate_start",
            sessions = catalog.session_count(),
            morning_groups = groups.morning.group_count(),
            evening_groups = groups.evening.group_count(),
            workers,
            branch_factor = self.config.branch_factor,
        );

        let outcome = self.run_search(&catalog, &groups, workers)?;

        match &outcome.solution {
            Some(timetable) => {
                self.set_status(GenerationStatus::SolutionFound {
                    score: timetable.score(),
                });
                self.gateway
                    .save_timetable(timetable, timetable.score(), "solution");
                self.supervisor.on_solution(timetable);
                info!(
                    event = "generate_end",
                    outcome = "solved",
                    score = timetable.score().value(),
                    rounds = outcome.stats.rounds,
                    branches = outcome.stats.branches_spawned,
                );
            }
            None => {
                self.set_status(GenerationStatus::NoSolutionYet {
                    rounds: outcome.stats.rounds,
                });
                if let Some(diagnostic) = &outcome.best_failure {
                    self.gateway
                        .save_timetable(diagnostic, diagnostic.score(), "diagnostic");
                }
                info!(
                    event = "generate_end",
                    outcome = "unsolved",
                    rounds = outcome.stats.rounds,
                    branches = outcome.stats.branches_spawned,
                );
            }
        }
        Ok(outcome)
    }

    /// Expands the request into the session catalog, joining fixed
    /// rules to their assignments.
    fn build_catalog(&self, request: &GenerationRequest) -> Result<SessionCatalog> {
        let mut fixed: HashMap<(String, GroupKey), &[FixedSlot]> = HashMap::new();
        for rule in &request.fixed_rules {
            let key = (rule.subject.clone(), rule.group.clone());
            if fixed.insert(key, &rule.slots).is_some() {
                return Err(EngineError::InvalidCatalog(format!(
                    "duplicate fixed rule for '{}' of {}",
                    rule.subject, rule.group
                )));
            }
        }

        self.check_elective_blocks(request)?;

        let mut catalog = SessionCatalog::new();
        for assignment in &request.assignments {
            let key = (
                assignment.subject.name().to_string(),
                assignment.subject.group().clone(),
            );
            let slots = fixed.remove(&key).unwrap_or(&[]);
            catalog.add_assignment(
                assignment.subject.clone(),
                assignment.teacher.clone(),
                assignment.morning,
                slots,
            )?;
        }
        if let Some((subject, group)) = fixed.keys().next() {
            return Err(EngineError::InvalidCatalog(format!(
                "fixed rule for unknown subject '{subject}' of {group}"
            )));
        }
        for reduction in &request.reductions {
            catalog.add_reduction(
                reduction.teacher.clone(),
                reduction.group.clone(),
                reduction.morning,
                reduction.hours,
            )?;
        }
        if catalog.session_count() == 0 {
            return Err(EngineError::InvalidCatalog(
                "the request contains no sessions".to_string(),
            ));
        }
        Ok(catalog)
    }

    /// Cross-checks declared elective blocks against the persistence
    /// layer's sibling records.
    fn check_elective_blocks(&self, request: &GenerationRequest) -> Result<()> {
        for assignment in &request.assignments {
            let subject = &assignment.subject;
            let Some(block) = subject.elective_block() else {
                continue;
            };
            for sibling in self.gateway.elective_siblings(subject) {
                if sibling.elective_block() != Some(block) {
                    return Err(EngineError::InvalidCatalog(format!(
                        "'{sibling}' is recorded as an elective sibling of '{subject}' \
                         but is not in block '{block}'"
                    )));
                }
                let assigned = request
                    .assignments
                    .iter()
                    .any(|other| other.subject == sibling);
                if !assigned {
                    warn!(
                        event = "elective_sibling_unassigned",
                        subject = %sibling,
                        block = %block,
                    );
                }
            }
        }
        Ok(())
    }

    /// Looks up the column block of every course group in the catalog.
    fn resolve_groups(&self, catalog: &SessionCatalog) -> Result<GroupIndexMaps> {
        let mut groups = GroupIndexMaps::default();
        for session in catalog.sessions() {
            let morning = session.is_morning();
            let group = session.group();
            let map = if morning {
                &mut groups.morning
            } else {
                &mut groups.evening
            };
            if map.index_of(group).is_some() {
                continue;
            }
            let Some(index) = self.gateway.group_index(group, morning) else {
                return Err(EngineError::InvalidCatalog(format!(
                    "course group {} has no column index in the {} schedule",
                    group,
                    if morning { "morning" } else { "evening" },
                )));
            };
            map.insert(group.clone(), index);
        }
        Ok(groups)
    }

    fn run_search(
        &self,
        catalog: &SessionCatalog,
        groups: &GroupIndexMaps,
        workers: usize,
    ) -> Result<GenerationOutcome> {
        let scorer = Scorer::new(self.config.score_weights);
        let aggregator = SolutionAggregator::new(
            scorer,
            Score::of(self.config.min_solution_score),
            Score::of(self.config.min_failure_score),
        );
        let stats = StatsCollector::new();
        let fatal = Mutex::new(None);

        let (work_tx, work_rx) = unbounded();
        let (done_tx, done_rx) = unbounded();
        let outstanding = OutstandingWork::new(done_tx);
        let ctx = SearchContext {
            aggregator: &aggregator,
            outstanding: &outstanding,
            stats: &stats,
            groups,
            branch_factor: self.config.branch_factor.max(1),
            fatal: &fatal,
        };

        let mut master_rng = match self.config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let board = Board::new(
            groups.morning.group_count(),
            groups.evening.group_count(),
        );

        let search = thread::scope(|scope| {
            for _ in 0..workers {
                let work_rx = work_rx.clone();
                let work_tx = work_tx.clone();
                let ctx = &ctx;
                scope.spawn(move || worker_loop(&work_rx, &work_tx, ctx));
            }

            let mut round = 0u32;
            let result = loop {
                round += 1;
                stats.record_round();
                self.set_status(GenerationStatus::InProgress { rounds: round });

                let root = BranchState::new(
                    catalog.snapshot(),
                    board.clone(),
                    StdRng::seed_from_u64(master_rng.random()),
                );
                outstanding.increment();
                stats.record_spawned();
                if work_tx.send(WorkItem::Branch(Box::new(root))).is_err() {
                    break Err(EngineError::Internal(
                        "worker pool dropped the work channel".to_string(),
                    ));
                }
                if done_rx.recv().is_err() {
                    break Err(EngineError::Internal(
                        "round completion signal lost".to_string(),
                    ));
                }
                if let Some(err) = fatal.lock().unwrap().take() {
                    break Err(err);
                }
                if aggregator.has_solution() {
                    break Ok(());
                }

                match self.supervisor.on_no_solution_found(round) {
                    SearchDirective::Restart => {
                        let so_far = stats.snapshot();
                        debug!(
                            event = "round_stats",
                            round,
                            branches = so_far.branches_spawned,
                            completed = so_far.branches_completed,
                            failed = so_far.branches_failed,
                            preempted = so_far.branches_preempted,
                        );
                        info!(
                            event = "round_restart",
                            round,
                            best_failure = ?aggregator.best_failure_score(),
                        );
                    }
                    SearchDirective::Abort => {
                        info!(event = "search_aborted", rounds = round);
                        break Ok(());
                    }
                }
            };

            for _ in 0..workers {
                let _ = work_tx.send(WorkItem::Shutdown);
            }
            result
        });
        search?;

        Ok(GenerationOutcome {
            solution: aggregator.current_solution(),
            best_failure: aggregator.current_failure(),
            stats: stats.snapshot(),
        })
    }
}
