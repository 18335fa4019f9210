//! Builders for schools, requests and configurations used in tests.

use horarium_config::{GeneratorConfig, ThreadCount};
use horarium_core::{Availability, ElectiveBlock, FixedSlot, GroupKey, Stage, Subject, Teacher};
use horarium_engine::GenerationRequest;

use crate::memory::MemoryGateway;

pub fn subject(name: &str, group: &str, hours: u8) -> Subject {
    Subject::new(name, GroupKey::new(group), hours, Stage::EsoBachillerato)
}

pub fn vocational_subject(name: &str, group: &str, hours: u8) -> Subject {
    Subject::new(name, GroupKey::new(group), hours, Stage::Vocational)
}

pub fn elective_subject(name: &str, group: &str, hours: u8, block: &str) -> Subject {
    subject(name, group, hours).with_elective_block(ElectiveBlock::new(block))
}

pub fn teacher(email: &str, name: &str) -> Teacher {
    Teacher::new(email, name)
}

pub fn early_leaver(email: &str, name: &str) -> Teacher {
    Teacher::new(email, name).with_availability(Availability::LeavesBeforeFifth)
}

pub fn late_arriver(email: &str, name: &str) -> Teacher {
    Teacher::new(email, name).with_availability(Availability::ArrivesAfterSecond)
}

/// A small deterministic configuration for tests.
pub fn fast_config(seed: u64) -> GeneratorConfig {
    GeneratorConfig::new()
        .with_worker_threads(ThreadCount::Specific(2))
        .with_branch_factor(2)
        .with_random_seed(seed)
}

/// A gateway pre-registered with a single morning group.
pub fn single_group_gateway(group: &str) -> MemoryGateway {
    let gateway = MemoryGateway::new();
    gateway.register_group(GroupKey::new(group), true, 0);
    gateway
}

/// A solvable two-group morning school with an evening vocational
/// group, covering electives, availability restrictions, fixed slots
/// and a reduction.
///
/// Pair with [`sample_gateway`], which knows the same groups and
/// subjects.
pub fn sample_school() -> GenerationRequest {
    let maths_a = subject("Mathematics", "1º ESO A", 3);
    let maths_b = subject("Mathematics", "1º ESO B", 3);
    let language_a = subject("Language", "1º ESO A", 3);
    let language_b = subject("Language", "1º ESO B", 3);
    let history_a = subject("History", "1º ESO A", 2);
    let history_b = subject("History", "1º ESO B", 2);
    let science_a = subject("Science", "1º ESO A", 2);
    let french_a = elective_subject("French", "1º ESO A", 2, "optatives-1");
    let music_a = elective_subject("Music", "1º ESO A", 2, "optatives-1");
    let pe_a = subject("Physical Education", "1º ESO A", 1);
    let pe_b = subject("Physical Education", "1º ESO B", 1);
    let electronics = vocational_subject("Electronics", "FP Nocturno", 4);

    let alicia = teacher("alicia@school.es", "Alicia");
    let bruno = teacher("bruno@school.es", "Bruno");
    let carmen = early_leaver("carmen@school.es", "Carmen");
    let dario = late_arriver("dario@school.es", "Darío");
    let elena = teacher("elena@school.es", "Elena");
    let felix = teacher("felix@school.es", "Félix");
    let gloria = teacher("gloria@school.es", "Gloria");
    let hector = teacher("hector@school.es", "Héctor");

    GenerationRequest::new()
        .with_assignment(maths_a, alicia.clone(), true)
        .with_assignment(maths_b, alicia, true)
        .with_assignment(language_a, bruno.clone(), true)
        .with_assignment(language_b, bruno, true)
        .with_assignment(history_a, carmen.clone(), true)
        .with_assignment(history_b, carmen, true)
        .with_assignment(science_a, dario.clone(), true)
        .with_assignment(french_a, elena, true)
        .with_assignment(music_a, felix, true)
        .with_assignment(pe_a, gloria.clone(), true)
        .with_assignment(pe_b, gloria, true)
        .with_assignment(electronics, hector, false)
        .with_fixed_rule(
            "Physical Education",
            GroupKey::new("1º ESO A"),
            vec![FixedSlot::day(4)],
        )
        .with_reduction(dario, GroupKey::new("1º ESO A"), true, 1)
}

/// The gateway matching [`sample_school`].
pub fn sample_gateway() -> MemoryGateway {
    let gateway = MemoryGateway::new();
    gateway.register_group(GroupKey::new("1º ESO A"), true, 0);
    gateway.register_group(GroupKey::new("1º ESO B"), true, 1);
    gateway.register_group(GroupKey::new("FP Nocturno"), false, 0);
    gateway.register_subject(elective_subject("French", "1º ESO A", 2, "optatives-1"));
    gateway.register_subject(elective_subject("Music", "1º ESO A", 2, "optatives-1"));
    gateway
}
