//! Conflict detection. Two active exams conflict when they share a room or
//! a professor at exactly the same `starts_at`. Equality is exact timestamp
//! match, not interval overlap: exams whose intervals overlap but start at
//! different times are not flagged.

use std::collections::HashSet;

use rusqlite::Connection;

use crate::error::Result;
use crate::models::{ConflictDetail, ConflictKind, ConflictPair, DATETIME_FORMAT, ExamSlot};
use crate::store::exams;

/// Default page size for conflict reporting.
pub const DETAIL_PAGE_SIZE: usize = 20;

/// Every unordered pair of exams double-booking a room or a professor.
/// A pair sharing both room and professor is reported once, as a room
/// conflict. Pairs come out ordered by datetime, then exam ids.
pub fn find_conflicts(exams: &[ExamSlot]) -> Vec<ConflictPair> {
    let mut pairs = Vec::new();
    for (i, a) in exams.iter().enumerate() {
        for b in &exams[i + 1..] {
            if a.starts_at != b.starts_at {
                continue;
            }
            let kind = if a.room_id == b.room_id {
                ConflictKind::RoomConflict
            } else if a.professor_id == b.professor_id {
                ConflictKind::ProfessorConflict
            } else {
                continue;
            };
            pairs.push(ConflictPair {
                first: a.id.min(b.id),
                second: a.id.max(b.id),
                kind,
                starts_at: a.starts_at,
            });
        }
    }
    pairs.sort_by(|x, y| {
        (x.starts_at, x.first, x.second).cmp(&(y.starts_at, y.first, y.second))
    });
    pairs
}

/// Distinct exams participating in at least one conflict.
pub fn conflicting_exam_ids(pairs: &[ConflictPair]) -> HashSet<i64> {
    let mut ids = HashSet::new();
    for p in pairs {
        ids.insert(p.first);
        ids.insert(p.second);
    }
    ids
}

/// Number of distinct active exams in conflict with another active exam.
pub fn count_conflicts(conn: &Connection) -> Result<usize> {
    let slots = exams::active_exam_slots(conn)?;
    let pairs = find_conflicts(&slots);
    Ok(conflicting_exam_ids(&pairs).len())
}

/// The full ordered conflict pair list.
pub fn conflict_pairs(conn: &Connection) -> Result<Vec<ConflictPair>> {
    let slots = exams::active_exam_slots(conn)?;
    Ok(find_conflicts(&slots))
}

/// Conflict pairs joined with module/professor/room names, truncated to
/// `limit` rows for reporting.
pub fn conflict_details(conn: &Connection, limit: usize) -> Result<Vec<ConflictDetail>> {
    let pairs = conflict_pairs(conn)?;
    let mut out = Vec::new();
    for p in pairs.into_iter().take(limit) {
        let Some((first_module, first_professor, room)) = exams::exam_display(conn, p.first)?
        else {
            continue;
        };
        let Some((second_module, second_professor, _)) = exams::exam_display(conn, p.second)?
        else {
            continue;
        };
        out.push(ConflictDetail {
            first_exam: p.first,
            second_exam: p.second,
            kind: p.kind,
            starts_at: p.starts_at.format(DATETIME_FORMAT).to_string(),
            first_module,
            second_module,
            first_professor,
            second_professor,
            room,
        });
    }
    Ok(out)
}
