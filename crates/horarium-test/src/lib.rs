//! Shared fixtures and test doubles for the Horarium crates.
//!
//! [`memory`] provides in-memory implementations of the engine's
//! integration seams; [`school`] builds the domain objects and requests
//! the tests and demos work with.

pub mod memory;
pub mod school;

pub use memory::{MemoryGateway, RecordingSupervisor, SavedTimetable};
