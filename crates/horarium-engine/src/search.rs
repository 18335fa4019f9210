//! Branch processing and the worker pool plumbing of the search.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crossbeam::channel::{Receiver, Sender};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error};

use horarium_core::{Board, EngineError, GroupIndexMaps};

use crate::aggregator::SolutionAggregator;
use crate::assigner::{assign, Placement};
use crate::catalog::SessionBuckets;
use crate::selector::select_next;
use crate::stats::StatsCollector;

/// The full state of one search branch.
///
/// Branches share nothing mutable: buckets and board are deep clones,
/// and each branch owns an independently seeded random generator.
#[derive(Debug)]
pub(crate) struct BranchState {
    buckets: SessionBuckets,
    board: Board,
    last: Option<Placement>,
    rng: StdRng,
}

impl BranchState {
    pub(crate) fn new(buckets: SessionBuckets, board: Board, rng: StdRng) -> Self {
        BranchState {
            buckets,
            board,
            last: None,
            rng,
        }
    }

    fn child(&self, seed: u64) -> Self {
        BranchState {
            buckets: self.buckets.clone(),
            board: self.board.clone(),
            last: self.last.clone(),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

/// What travels through the work channel.
pub(crate) enum WorkItem {
    Branch(Box<BranchState>),
    Shutdown,
}

/// Counts branches in flight and signals when a round has drained.
///
/// Incremented before a branch is enqueued, decremented exactly once
/// after it has been processed; the decrement that reaches zero sends
/// the round-done signal.
pub(crate) struct OutstandingWork {
    count: AtomicUsize,
    done: Sender<()>,
}

impl OutstandingWork {
    pub(crate) fn new(done: Sender<()>) -> Self {
        OutstandingWork {
            count: AtomicUsize::new(0),
            done,
        }
    }

    pub(crate) fn increment(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn decrement(&self) {
        if self.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.done.send(());
        }
    }
}

/// Everything a worker needs, borrowed for the lifetime of the pool.
pub(crate) struct SearchContext<'a> {
    pub(crate) aggregator: &'a SolutionAggregator,
    pub(crate) outstanding: &'a OutstandingWork,
    pub(crate) stats: &'a StatsCollector,
    pub(crate) groups: &'a GroupIndexMaps,
    pub(crate) branch_factor: usize,
    pub(crate) fatal: &'a Mutex<Option<EngineError>>,
}

impl SearchContext<'_> {
    /// First fatal error wins; later ones are only logged.
    fn record_fatal(&self, err: EngineError) {
        error!(event = "branch_fatal", error = %err);
        let mut slot = self.fatal.lock().unwrap();
        if slot.is_none() {
            *slot = Some(err);
        }
    }
}

/// Blocks on the work channel until a shutdown sentinel arrives.
pub(crate) fn worker_loop(
    work_rx: &Receiver<WorkItem>,
    work_tx: &Sender<WorkItem>,
    ctx: &SearchContext<'_>,
) {
    while let Ok(item) = work_rx.recv() {
        match item {
            WorkItem::Branch(state) => {
                process_branch(*state, ctx, work_tx);
                ctx.outstanding.decrement();
            }
            WorkItem::Shutdown => break,
        }
    }
}

/// Drives one branch until it reaches a terminal state.
///
/// Each successful placement turns the branch into `branch_factor`
/// continuations: the worker keeps the first for itself and enqueues
/// the rest as sibling clones, so the pool descends depth-first while
/// idle workers pick up the alternatives. The branch ends by completing
/// the board, by failing on an unplaceable session, or by preemption
/// once a qualifying solution exists elsewhere.
fn process_branch(mut state: BranchState, ctx: &SearchContext<'_>, work_tx: &Sender<WorkItem>) {
    loop {
        if ctx.aggregator.has_solution() {
            ctx.stats.record_preempted();
            debug!(event = "branch_preempted", pending = state.buckets.pending());
            return;
        }

        if state.buckets.is_empty() {
            let score = ctx.aggregator.report_solution(state.board);
            ctx.stats.record_completed();
            debug!(event = "branch_completed", score = score.value());
            return;
        }

        let Some(session) = select_next(&mut state.buckets, state.last.as_ref(), &mut state.rng)
        else {
            ctx.record_fatal(EngineError::Internal(
                "selection yielded nothing from non-empty buckets".to_string(),
            ));
            return;
        };

        let Some(start_day) = ctx.groups.start_day(session.group(), session.is_morning()) else {
            ctx.record_fatal(EngineError::Internal(format!(
                "course group {} missing from the index map",
                session.group()
            )));
            return;
        };

        let unplaced = state.buckets.pending() + 1;
        let matrix = state.board.matrix_mut(session.is_morning());
        match assign(&session, start_day, matrix, &mut state.rng) {
            Ok(placement) => {
                state.last = Some(placement);
                for _ in 1..ctx.branch_factor {
                    let seed = state.rng.random();
                    let sibling = state.child(seed);
                    ctx.outstanding.increment();
                    ctx.stats.record_spawned();
                    if work_tx.send(WorkItem::Branch(Box::new(sibling))).is_err() {
                        // pool is shutting down
                        ctx.outstanding.decrement();
                        return;
                    }
                }
            }
            Err(EngineError::NoDaysAvailable) => {
                ctx.stats.record_failed();
                let score = ctx.aggregator.report_failure(state.board);
                debug!(event = "branch_failed", unplaced, score = score.value());
                return;
            }
            Err(err) => {
                ctx.record_fatal(err);
                return;
            }
        }
    }
}
