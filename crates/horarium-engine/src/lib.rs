//! Weekly school timetable generation by randomized parallel search.
//!
//! The engine expands teaching assignments into a catalog of sessions,
//! files them into priority buckets and searches for a full placement:
//! every branch of the search repeatedly selects the next session from
//! the most constrained bucket, draws a feasible slot at random, commits
//! it and forks clones of itself to explore the alternatives. Branches
//! run on a fixed pool of workers; finished boards meet in a shared
//! aggregator that keeps the best solution and, for unsolvable weeks,
//! the best partial board as a diagnostic.
//!
//! [`TimetableGenerator`] is the entry point; everything else is the
//! machinery behind [`TimetableGenerator::generate`].

pub mod aggregator;
pub mod assigner;
pub mod catalog;
pub mod generator;
pub mod scorer;
mod search;
pub mod selector;
pub mod slots;
pub mod stats;

pub use aggregator::SolutionAggregator;
pub use assigner::{assign, Placement};
pub use catalog::{Bucket, BucketKind, SessionBuckets, SessionCatalog};
pub use generator::{
    FixedRule, GenerationOutcome, GenerationRequest, GenerationStatus, ReductionAssignment,
    TeachingAssignment, TimetableGenerator,
};
pub use scorer::Scorer;
pub use selector::select_next;
pub use slots::{candidate_slots, CandidateSlots, SlotWindow};
pub use stats::{RoundStats, StatsCollector};
