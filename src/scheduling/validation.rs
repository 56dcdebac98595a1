//! The validation gate, manual scheduling and the administrative reset.
//! Validation is all-or-nothing: either the whole proposed schedule is
//! promoted or nothing moves.

use chrono::NaiveDateTime;
use rusqlite::Connection;

use crate::error::{Result, ScheduleError};
use crate::models::{GenerationMode, ValidationReport};
use crate::scheduling::conflict::{conflicting_exam_ids, find_conflicts};
use crate::store::{catalog, exams};

/// Promote every PROPOSED exam to VALIDATED, recording `actor`.
///
/// Blocked with `ConflictPresent` while any conflict remains; the store is
/// left untouched in that case. Calling again once the schedule is already
/// validated is a no-op success.
pub fn validate_schedule(conn: &mut Connection, actor: &str) -> Result<ValidationReport> {
    let tx = conn.transaction()?;

    let slots = exams::active_exam_slots(&tx)?;
    let conflicts = conflicting_exam_ids(&find_conflicts(&slots)).len();
    if conflicts > 0 {
        return Err(ScheduleError::ConflictPresent { conflicts });
    }

    let validated = exams::proposed_to_validated(&tx, actor)?;
    tx.commit()?;

    let message = if validated == 0 {
        "schedule already validated".to_string()
    } else {
        format!("{} exam(s) validated", validated)
    };
    tracing::info!(validated, actor, "schedule validated");
    Ok(ValidationReport { validated, message })
}

/// A manually entered exam. Unlike generated assignments it is checked for
/// availability up front and refused instead of creating a conflict.
#[derive(Debug, Clone)]
pub struct ManualExamRequest {
    pub module_id: i64,
    pub professor_id: i64,
    pub room_id: i64,
    pub starts_at: NaiveDateTime,
    pub duration_minutes: i64,
}

/// Insert one MANUAL exam after explicit pre-insert validation. Returns the
/// new exam id.
pub fn add_manual_exam(conn: &mut Connection, req: &ManualExamRequest) -> Result<i64> {
    let tx = conn.transaction()?;

    if !catalog::module_exists(&tx, req.module_id)? {
        return Err(ScheduleError::ConstraintViolation {
            reason: format!("unknown module {}", req.module_id),
        });
    }
    if !catalog::professor_exists(&tx, req.professor_id)? {
        return Err(ScheduleError::ConstraintViolation {
            reason: format!("unknown professor {}", req.professor_id),
        });
    }
    if !catalog::room_exists(&tx, req.room_id)? {
        return Err(ScheduleError::ConstraintViolation {
            reason: format!("unknown room {}", req.room_id),
        });
    }
    if exams::module_has_active_exam(&tx, req.module_id)? {
        return Err(ScheduleError::ConstraintViolation {
            reason: format!("module {} already has an active exam", req.module_id),
        });
    }
    if !exams::room_is_free(&tx, req.room_id, req.starts_at)? {
        return Err(ScheduleError::ConstraintViolation {
            reason: format!(
                "room {} is not available at {}",
                req.room_id, req.starts_at
            ),
        });
    }

    let id = exams::insert_exam(
        &tx,
        &exams::NewExam {
            module_id: req.module_id,
            professor_id: req.professor_id,
            room_id: req.room_id,
            starts_at: req.starts_at,
            duration_minutes: req.duration_minutes,
            generation_mode: GenerationMode::Manual,
            created_by: "manual",
        },
    )?;
    tx.commit()?;
    tracing::info!(exam_id = id, module_id = req.module_id, "manual exam added");
    Ok(id)
}

/// Cancel every active exam (rows are kept with status CANCELLED). Returns
/// how many were cancelled.
pub fn reset_schedule(conn: &mut Connection, actor: &str) -> Result<usize> {
    let tx = conn.transaction()?;
    let cancelled = exams::cancel_all_active(&tx, actor)?;
    tx.commit()?;
    tracing::info!(cancelled, actor, "schedule reset");
    Ok(cancelled)
}
