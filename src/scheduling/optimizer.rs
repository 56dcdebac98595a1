//! Greedy conflict resolution. Single pass, no backtracking: it reduces the
//! conflict count where a cheap move exists and leaves the rest for the
//! operator. Room reassignment keeps the exam's datetime, so a successful
//! move can never introduce a new conflict.

use std::collections::HashSet;
use std::time::Instant;

use rand::seq::IndexedRandom;
use rusqlite::Connection;

use crate::error::Result;
use crate::models::{ConflictKind, OptimizationReport, OptimizeMode};
use crate::scheduling::conflict::{conflicting_exam_ids, find_conflicts};
use crate::scheduling::seeded_rng;
use crate::store::{catalog, exams};

/// A professor with more active exams than this is overloaded.
pub const OVERLOAD_THRESHOLD: i64 = 4;

/// Resolve conflicts in the active schedule.
///
/// Both modes run the room pass: for every room conflict, the later exam of
/// the pair is moved to the smallest alternative room that fits the
/// module's enrollment and is free at that exact datetime. FULL additionally
/// rebalances overloaded professors with one greedy same-department swap
/// each.
pub fn optimize_schedule(
    conn: &mut Connection,
    mode: OptimizeMode,
    seed: Option<u64>,
) -> Result<OptimizationReport> {
    let started = Instant::now();
    let mut rng = seeded_rng(seed);
    let tx = conn.transaction()?;

    let slots = exams::active_exam_slots(&tx)?;
    let pairs = find_conflicts(&slots);
    let conflicts_before = conflicting_exam_ids(&pairs).len();

    let rooms = catalog::list_rooms(&tx)?;
    let mut resolved = 0usize;
    let mut moved: HashSet<i64> = HashSet::new();

    for pair in pairs.iter().filter(|p| p.kind == ConflictKind::RoomConflict) {
        // the later exam moves; the earlier assignment wins
        let victim = pair.second;
        if moved.contains(&victim) {
            continue;
        }
        let Some((current_room, enrolled)) = exams::exam_placement(&tx, victim)? else {
            continue;
        };
        for room in rooms
            .iter()
            .filter(|r| r.id != current_room && r.capacity >= enrolled)
        {
            if exams::room_is_free(&tx, room.id, pair.starts_at)? {
                exams::reassign_room(&tx, victim, room.id, "optimizer")?;
                tracing::info!(exam_id = victim, room_id = room.id, "room conflict resolved");
                moved.insert(victim);
                resolved += 1;
                break;
            }
        }
        // no free room with enough seats: the exam stays unresolved
    }

    let mut rebalanced = 0usize;
    if mode == OptimizeMode::Full {
        let professors = catalog::list_professors(&tx)?;
        for (professor_id, count) in exams::professor_exam_counts(&tx)? {
            if count <= OVERLOAD_THRESHOLD {
                break;
            }
            let owned = exams::exams_of_professor(&tx, professor_id)?;
            let Some(&exam_id) = owned.choose(&mut rng) else {
                continue;
            };
            let Some(dept_id) = exams::exam_module_department(&tx, exam_id)? else {
                continue;
            };
            let candidates: Vec<i64> = professors
                .iter()
                .filter(|p| p.dept_id == dept_id && p.id != professor_id)
                .map(|p| p.id)
                .collect();
            if let Some(&replacement) = candidates.choose(&mut rng) {
                exams::reassign_professor(&tx, exam_id, replacement, "optimizer")?;
                tracing::info!(
                    exam_id,
                    from = professor_id,
                    to = replacement,
                    "overloaded professor rebalanced"
                );
                rebalanced += 1;
            }
        }
    }

    let slots_after = exams::active_exam_slots(&tx)?;
    let remaining = conflicting_exam_ids(&find_conflicts(&slots_after)).len();
    tx.commit()?;

    let report = OptimizationReport {
        mode,
        conflicts_before,
        resolved,
        remaining,
        rebalanced,
        elapsed_ms: started.elapsed().as_millis() as u64,
    };
    tracing::info!(
        resolved = report.resolved,
        remaining = report.remaining,
        rebalanced = report.rebalanced,
        "optimization pass finished"
    );
    Ok(report)
}
