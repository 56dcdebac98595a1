//! Assignment generation. Picks up modules without an active exam and gives
//! each a room, a professor and a timeslot in one pass. No occupancy check
//! happens here: generation optimizes for throughput and leaves conflicts
//! to the resolver downstream.

use std::time::Instant;

use chrono::{Local, NaiveDate};
use rand::seq::{IndexedRandom, SliceRandom};
use rusqlite::Connection;

use crate::error::{Result, ScheduleError};
use crate::models::{GenerationMode, GenerationReport, Professor};
use crate::scheduling::{seeded_rng, slots};
use crate::store::{catalog, exams};

/// Reasons recorded for failed modules are cut off at this length.
const FAILURE_REASON_MAX: usize = 80;

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Maximum number of modules to schedule in this batch.
    pub target_count: usize,
    pub duration_minutes: i64,
    /// Horizon of the candidate timeslot calendar.
    pub days_ahead: u32,
    /// First calendar day; defaults to today. Injectable for reproducibility.
    pub start_from: Option<NaiveDate>,
    /// Explicit seed makes the whole batch deterministic.
    pub seed: Option<u64>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            target_count: 50,
            duration_minutes: 120,
            days_ahead: 30,
            start_from: None,
            seed: None,
        }
    }
}

/// Schedule up to `target_count` unscheduled modules.
///
/// Placement rules:
/// - room: smallest capacity that fits the module's enrollment, falling
///   back to the single largest room in the catalog;
/// - professor: random pick within the module's department, falling back
///   to any professor;
/// - timeslot: random pick from the candidate calendar.
///
/// The whole batch runs in one transaction. A per-module insert failure is
/// recorded with a truncated reason and does not abort the rest of the
/// batch.
pub fn generate_schedule(conn: &mut Connection, opts: &GenerateOptions) -> Result<GenerationReport> {
    let started = Instant::now();
    let tx = conn.transaction()?;

    let mut modules = catalog::unscheduled_modules(&tx, -1)?;
    if modules.is_empty() {
        return Err(ScheduleError::ResourceExhausted {
            what: "unscheduled modules",
        });
    }
    let rooms = catalog::list_rooms(&tx)?;
    if rooms.is_empty() {
        return Err(ScheduleError::ResourceExhausted { what: "rooms" });
    }
    let professors = catalog::list_professors(&tx)?;
    if professors.is_empty() {
        return Err(ScheduleError::ResourceExhausted { what: "professors" });
    }
    let from = opts.start_from.unwrap_or_else(|| Local::now().date_naive());
    let calendar = slots::candidate_timeslots(from, opts.days_ahead);
    if calendar.is_empty() {
        return Err(ScheduleError::ResourceExhausted { what: "timeslots" });
    }

    let mut rng = seeded_rng(opts.seed);
    modules.shuffle(&mut rng);
    modules.truncate(opts.target_count);

    let mut scheduled = 0usize;
    let mut failed = 0usize;
    let mut failures = Vec::new();

    for module in &modules {
        // rooms are sorted by ascending capacity, so the first fit is the
        // smallest adequate one and the last room is the largest fallback
        let Some(room) = rooms
            .iter()
            .find(|r| r.capacity >= module.enrolled_count)
            .or(rooms.last())
        else {
            continue;
        };

        let in_department: Vec<&Professor> =
            professors.iter().filter(|p| p.dept_id == module.dept_id).collect();
        let professor = match in_department.choose(&mut rng) {
            Some(p) => *p,
            None => match professors.choose(&mut rng) {
                Some(p) => p,
                None => continue,
            },
        };

        let Some(&starts_at) = calendar.choose(&mut rng) else {
            continue;
        };

        let new = exams::NewExam {
            module_id: module.id,
            professor_id: professor.id,
            room_id: room.id,
            starts_at,
            duration_minutes: opts.duration_minutes,
            generation_mode: GenerationMode::Auto,
            created_by: "generator",
        };
        match exams::insert_exam(&tx, &new) {
            Ok(_) => scheduled += 1,
            Err(e) => {
                failed += 1;
                let mut reason = format!("module {}: {}", module.name, e);
                reason.truncate(FAILURE_REASON_MAX);
                tracing::warn!(module_id = module.id, %reason, "exam insert failed");
                failures.push(reason);
            }
        }
    }

    tx.commit()?;

    let report = GenerationReport {
        requested: opts.target_count,
        processed: modules.len(),
        scheduled,
        failed,
        failures,
        elapsed_ms: started.elapsed().as_millis() as u64,
    };
    tracing::info!(
        scheduled = report.scheduled,
        failed = report.failed,
        elapsed_ms = report.elapsed_ms,
        "generation batch finished"
    );
    Ok(report)
}
