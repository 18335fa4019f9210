//! Sample School Demo
//!
//! Generates the weekly timetable of a small secondary school: two
//! morning ESO groups and one evening vocational group, with an
//! elective block, teacher availability restrictions, a pre-fixed
//! session and reduction hours.
//!
//! This demo shows how to feed a [`GenerationRequest`] to the engine
//! and render the resulting week grids.

use std::collections::HashMap;
use std::sync::Arc;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use horarium_config::GeneratorConfig;
use horarium_core::{
    AssignmentMatrix, Availability, CellAssignment, ElectiveBlock, FixedSlot, GroupKey,
    PersistenceGateway, Score, SearchDirective, Stage, Subject, Supervisor, Teacher, Timetable,
    PERIODS_PER_DAY, WEEKDAYS,
};
use horarium_engine::{GenerationRequest, TimetableGenerator};

const DAY_NAMES: [&str; WEEKDAYS] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];
const CELL_WIDTH: usize = 20;

/// Gateway backed by the demo's own in-process school records.
#[derive(Debug)]
struct SchoolGateway {
    groups: HashMap<(GroupKey, bool), usize>,
    electives: Vec<Subject>,
}

impl SchoolGateway {
    fn new() -> Self {
        let mut groups = HashMap::new();
        groups.insert((GroupKey::new("3º ESO A"), true), 0);
        groups.insert((GroupKey::new("3º ESO B"), true), 1);
        groups.insert((GroupKey::new("FP Electricidad"), false), 0);
        SchoolGateway {
            groups,
            electives: vec![
                elective("Technology", "3º ESO A", 2),
                elective("Art", "3º ESO A", 2),
            ],
        }
    }
}

impl PersistenceGateway for SchoolGateway {
    fn save_timetable(&self, timetable: &Timetable, score: Score, note: &str) {
        println!(
            "[gateway] stored {} timetable: {} sessions, score {}",
            note,
            timetable.placed_sessions(),
            score
        );
    }

    fn elective_siblings(&self, subject: &Subject) -> Vec<Subject> {
        let Some(block) = subject.elective_block() else {
            return Vec::new();
        };
        self.electives
            .iter()
            .filter(|candidate| candidate.in_block(block) && *candidate != subject)
            .cloned()
            .collect()
    }

    fn group_index(&self, group: &GroupKey, morning: bool) -> Option<usize> {
        self.groups.get(&(group.clone(), morning)).copied()
    }
}

/// Prints round progress and gives up after a bounded number of rounds.
#[derive(Debug)]
struct ConsoleSupervisor {
    max_rounds: u32,
}

impl Supervisor for ConsoleSupervisor {
    fn on_no_solution_found(&self, rounds: u32) -> SearchDirective {
        if rounds >= self.max_rounds {
            println!("No full timetable after {rounds} rounds, giving up.");
            SearchDirective::Abort
        } else {
            println!("Round {rounds} ended without a full timetable, restarting.");
            SearchDirective::Restart
        }
    }
}

fn subject(name: &str, group: &str, hours: u8) -> Subject {
    Subject::new(name, GroupKey::new(group), hours, Stage::EsoBachillerato)
}

fn elective(name: &str, group: &str, hours: u8) -> Subject {
    subject(name, group, hours).with_elective_block(ElectiveBlock::new("optativa-3"))
}

fn vocational(name: &str, group: &str, hours: u8) -> Subject {
    Subject::new(name, GroupKey::new(group), hours, Stage::Vocational)
}

/// The demo school: every teaching duty of the week.
fn build_request() -> GenerationRequest {
    let nuria = Teacher::new("nuria@school.es", "Nuria");
    let pablo = Teacher::new("pablo@school.es", "Pablo");
    let lucia = Teacher::new("lucia@school.es", "Lucía")
        .with_availability(Availability::LeavesBeforeFifth);
    let sergio = Teacher::new("sergio@school.es", "Sergio")
        .with_availability(Availability::ArrivesAfterSecond);
    let irene = Teacher::new("irene@school.es", "Irene");
    let oscar = Teacher::new("oscar@school.es", "Óscar");
    let marcos = Teacher::new("marcos@school.es", "Marcos");
    let raquel = Teacher::new("raquel@school.es", "Raquel");
    let tomas = Teacher::new("tomas@school.es", "Tomás");

    GenerationRequest::new()
        .with_assignment(subject("Mathematics", "3º ESO A", 4), nuria.clone(), true)
        .with_assignment(subject("Mathematics", "3º ESO B", 4), nuria, true)
        .with_assignment(subject("Language", "3º ESO A", 4), pablo.clone(), true)
        .with_assignment(subject("Language", "3º ESO B", 4), pablo, true)
        .with_assignment(subject("English", "3º ESO A", 3), lucia.clone(), true)
        .with_assignment(subject("English", "3º ESO B", 3), lucia.clone(), true)
        .with_assignment(subject("Biology", "3º ESO A", 3), sergio, true)
        .with_assignment(elective("Technology", "3º ESO A", 2), irene, true)
        .with_assignment(elective("Art", "3º ESO A", 2), oscar, true)
        .with_assignment(subject("Physical Education", "3º ESO A", 2), marcos.clone(), true)
        .with_assignment(subject("Physical Education", "3º ESO B", 2), marcos, true)
        .with_assignment(
            vocational("Installations", "FP Electricidad", 6),
            raquel,
            false,
        )
        .with_assignment(vocational("Automatisms", "FP Electricidad", 4), tomas, false)
        .with_fixed_rule(
            "Physical Education",
            GroupKey::new("3º ESO A"),
            vec![FixedSlot::day(0)],
        )
        .with_reduction(lucia, GroupKey::new("3º ESO A"), true, 2)
}

fn cell_label(cell: Option<&CellAssignment>) -> String {
    let Some(cell) = cell else {
        return String::new();
    };
    cell.sessions()
        .iter()
        .map(|session| match session.subject() {
            Some(subject) => subject.name().to_string(),
            None => format!("Reduction {}", session.teacher().name()),
        })
        .collect::<Vec<_>>()
        .join(" + ")
}

/// Prints the 5x6 week grid of one group's column block.
fn print_group_week(title: &str, matrix: &AssignmentMatrix, block: usize) {
    let width = CELL_WIDTH;
    let line_width = 10 + (width + 1) * WEEKDAYS;
    println!("\n{title}");
    println!("{}", "-".repeat(line_width));

    print!("| Period |");
    for name in DAY_NAMES {
        print!("{name:<width$.width$}|");
    }
    println!();
    println!("{}", "-".repeat(line_width));

    for period in 0..PERIODS_PER_DAY {
        print!("|   {}    |", period + 1);
        for weekday in 0..WEEKDAYS {
            let day = block * WEEKDAYS + weekday;
            let label = cell_label(matrix.cell(day, period));
            print!("{label:<width$.width$}|");
        }
        println!();
    }
    println!("{}", "-".repeat(line_width));
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive("horarium_engine=info".parse().unwrap())
        .from_env_lossy();
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init();
}

fn main() {
    init_logging();

    println!("Horarium Sample School");
    println!("======================\n");
    println!("Two morning ESO groups, one evening vocational group.");
    println!("Lucía leaves before the fifth period, Sergio arrives after the second.");
    println!("Technology and Art form an elective block; Physical Education of");
    println!("3º ESO A is pinned to Monday; Lucía owes two reduction hours.\n");

    let request = build_request();
    let gateway = Arc::new(SchoolGateway::new());
    let supervisor = Arc::new(ConsoleSupervisor { max_rounds: 200 });

    let config = GeneratorConfig::new().with_branch_factor(3);
    let generator = TimetableGenerator::new(config, gateway, supervisor);

    let outcome = match generator.generate(&request) {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!("generation failed: {err}");
            std::process::exit(1);
        }
    };

    println!(
        "\nSearch ran {} rounds: {} branches, {} completed, {} failed, {} preempted.",
        outcome.stats.rounds,
        outcome.stats.branches_spawned,
        outcome.stats.branches_completed,
        outcome.stats.branches_failed,
        outcome.stats.branches_preempted,
    );

    let Some(timetable) = outcome.solution.as_deref().or(outcome.best_failure.as_deref()) else {
        println!("The search produced neither a solution nor a diagnostic.");
        return;
    };
    if outcome.is_solved() {
        println!("Found a full timetable.\n");
    } else {
        println!(
            "Showing the best partial timetable: {} sessions placed.\n",
            timetable.placed_sessions()
        );
    }

    print_group_week("3º ESO A (morning)", timetable.morning(), 0);
    print_group_week("3º ESO B (morning)", timetable.morning(), 1);
    print_group_week("FP Electricidad (evening)", timetable.evening(), 0);

    let breakdown = timetable.breakdown();
    println!("\nScore breakdown:");
    println!("  placed sessions:   {}", breakdown.placed_sessions);
    println!("  consecutive pairs: {}", breakdown.consecutive_pairs);
    println!("  teacher gaps:      {}", breakdown.teacher_gaps);
    println!("  total:             {}", breakdown.total);
}
