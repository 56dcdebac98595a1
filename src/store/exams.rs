//! Reads and writes against the `exams` table, the only entity the engine
//! owns. All status filtering lives here: "active" always means
//! status IN ('PROPOSED', 'VALIDATED').

use chrono::NaiveDateTime;
use rusqlite::{Connection, params};

use crate::error::Result;
use crate::models::{
    DATETIME_FORMAT, DayCount, DepartmentCount, Exam, ExamSlot, ExamStatus, GenerationMode,
    ProfessorLoad, ScheduleStatistics, TimetableEntry,
};

/// Parse a stored `starts_at` column inside a rusqlite row closure.
fn parse_datetime(s: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Fields of an exam row to be inserted. Status is always PROPOSED at
/// creation; VALIDATED is only reachable through the validation gate.
#[derive(Debug, Clone)]
pub struct NewExam<'a> {
    pub module_id: i64,
    pub professor_id: i64,
    pub room_id: i64,
    pub starts_at: NaiveDateTime,
    pub duration_minutes: i64,
    pub generation_mode: GenerationMode,
    pub created_by: &'a str,
}

pub fn insert_exam(conn: &Connection, new: &NewExam<'_>) -> Result<i64> {
    conn.execute(
        "INSERT INTO exams (module_id, professor_id, room_id, starts_at,
                            duration_minutes, generation_mode, status, priority,
                            last_modified_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'PROPOSED', 1, ?7)",
        params![
            new.module_id,
            new.professor_id,
            new.room_id,
            new.starts_at.format(DATETIME_FORMAT).to_string(),
            new.duration_minutes,
            new.generation_mode.as_str(),
            new.created_by,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Every active exam as the slim slot view the detector and resolver use,
/// ordered by datetime then id.
pub fn active_exam_slots(conn: &Connection) -> Result<Vec<ExamSlot>> {
    let mut stmt = conn.prepare(
        "SELECT id, module_id, professor_id, room_id, starts_at
         FROM exams
         WHERE status IN ('PROPOSED', 'VALIDATED')
         ORDER BY starts_at, id",
    )?;
    let rows = stmt.query_map([], |row| {
        let ts: String = row.get(4)?;
        Ok(ExamSlot {
            id: row.get(0)?,
            module_id: row.get(1)?,
            professor_id: row.get(2)?,
            room_id: row.get(3)?,
            starts_at: parse_datetime(&ts)?,
        })
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn module_has_active_exam(conn: &Connection, module_id: i64) -> Result<bool> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM exams
         WHERE module_id = ?1 AND status != 'CANCELLED'",
        params![module_id],
        |row| row.get(0),
    )?;
    Ok(n > 0)
}

/// True if no active exam occupies `room_id` at exactly `at`.
pub fn room_is_free(conn: &Connection, room_id: i64, at: NaiveDateTime) -> Result<bool> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM exams
         WHERE room_id = ?1 AND starts_at = ?2
           AND status IN ('PROPOSED', 'VALIDATED')",
        params![room_id, at.format(DATETIME_FORMAT).to_string()],
        |row| row.get(0),
    )?;
    Ok(n == 0)
}

pub fn reassign_room(conn: &Connection, exam_id: i64, room_id: i64, actor: &str) -> Result<usize> {
    let n = conn.execute(
        "UPDATE exams SET room_id = ?1, last_modified_by = ?2 WHERE id = ?3",
        params![room_id, actor, exam_id],
    )?;
    Ok(n)
}

pub fn reassign_professor(
    conn: &Connection,
    exam_id: i64,
    professor_id: i64,
    actor: &str,
) -> Result<usize> {
    let n = conn.execute(
        "UPDATE exams SET professor_id = ?1, last_modified_by = ?2 WHERE id = ?3",
        params![professor_id, actor, exam_id],
    )?;
    Ok(n)
}

/// Current room and enrollment of the exam's module, for the resolver's
/// capacity-aware room search.
pub fn exam_placement(conn: &Connection, exam_id: i64) -> Result<Option<(i64, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT x.room_id,
                (SELECT COUNT(*) FROM enrollments e WHERE e.module_id = x.module_id)
         FROM exams x WHERE x.id = ?1",
    )?;
    let mut rows = stmt.query(params![exam_id])?;
    match rows.next()? {
        Some(row) => Ok(Some((row.get(0)?, row.get(1)?))),
        None => Ok(None),
    }
}

/// Department of the exam's module (through its formation).
pub fn exam_module_department(conn: &Connection, exam_id: i64) -> Result<Option<i64>> {
    let mut stmt = conn.prepare(
        "SELECT f.dept_id
         FROM exams x
         JOIN modules m ON x.module_id = m.id
         JOIN formations f ON m.formation_id = f.id
         WHERE x.id = ?1",
    )?;
    let mut rows = stmt.query(params![exam_id])?;
    match rows.next()? {
        Some(row) => Ok(Some(row.get(0)?)),
        None => Ok(None),
    }
}

/// Active exam count per professor, busiest first.
pub fn professor_exam_counts(conn: &Connection) -> Result<Vec<(i64, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT professor_id, COUNT(*) FROM exams
         WHERE status IN ('PROPOSED', 'VALIDATED')
         GROUP BY professor_id
         ORDER BY COUNT(*) DESC, professor_id",
    )?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn exams_of_professor(conn: &Connection, professor_id: i64) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT id FROM exams
         WHERE professor_id = ?1 AND status IN ('PROPOSED', 'VALIDATED')
         ORDER BY id",
    )?;
    let rows = stmt.query_map(params![professor_id], |row| row.get(0))?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Transition every PROPOSED exam to VALIDATED, recording the actor.
/// Returns the number of rows that moved.
pub fn proposed_to_validated(conn: &Connection, actor: &str) -> Result<usize> {
    let n = conn.execute(
        "UPDATE exams SET status = 'VALIDATED', last_modified_by = ?1
         WHERE status = 'PROPOSED'",
        params![actor],
    )?;
    Ok(n)
}

/// Administrative reset: cancel every active exam. Rows are kept, not
/// deleted, so the module uniqueness history stays auditable.
pub fn cancel_all_active(conn: &Connection, actor: &str) -> Result<usize> {
    let n = conn.execute(
        "UPDATE exams SET status = 'CANCELLED', last_modified_by = ?1
         WHERE status IN ('PROPOSED', 'VALIDATED')",
        params![actor],
    )?;
    Ok(n)
}

pub fn get_exam(conn: &Connection, exam_id: i64) -> Result<Option<Exam>> {
    let mut stmt = conn.prepare(
        "SELECT id, module_id, professor_id, room_id, starts_at, duration_minutes,
                generation_mode, status, priority, last_modified_by
         FROM exams WHERE id = ?1",
    )?;
    let mut rows = stmt.query(params![exam_id])?;
    match rows.next()? {
        Some(row) => {
            let ts: String = row.get(4)?;
            let mode: String = row.get(6)?;
            let status: String = row.get(7)?;
            Ok(Some(Exam {
                id: row.get(0)?,
                module_id: row.get(1)?,
                professor_id: row.get(2)?,
                room_id: row.get(3)?,
                starts_at: parse_datetime(&ts)?,
                duration_minutes: row.get(5)?,
                generation_mode: GenerationMode::parse(&mode).unwrap_or(GenerationMode::Manual),
                status: ExamStatus::parse(&status).unwrap_or(ExamStatus::Cancelled),
                priority: row.get(8)?,
                last_modified_by: row.get(9)?,
            }))
        }
        None => Ok(None),
    }
}

/// Display names for one exam (module, professor, room), for conflict
/// reporting.
pub fn exam_display(conn: &Connection, exam_id: i64) -> Result<Option<(String, String, String)>> {
    let mut stmt = conn.prepare(
        "SELECT m.name, p.full_name, r.name
         FROM exams x
         JOIN modules m ON x.module_id = m.id
         JOIN professors p ON x.professor_id = p.id
         JOIN rooms r ON x.room_id = r.id
         WHERE x.id = ?1",
    )?;
    let mut rows = stmt.query(params![exam_id])?;
    match rows.next()? {
        Some(row) => Ok(Some((row.get(0)?, row.get(1)?, row.get(2)?))),
        None => Ok(None),
    }
}

/// The active timetable joined with catalog names, ordered by datetime.
pub fn timetable(conn: &Connection, limit: i64) -> Result<Vec<TimetableEntry>> {
    let mut stmt = conn.prepare(
        "SELECT x.id, x.starts_at, m.name, f.name, d.name, p.full_name,
                r.name, r.kind, r.capacity, x.duration_minutes,
                x.generation_mode, x.status
         FROM exams x
         JOIN modules m ON x.module_id = m.id
         JOIN formations f ON m.formation_id = f.id
         JOIN departments d ON f.dept_id = d.id
         JOIN professors p ON x.professor_id = p.id
         JOIN rooms r ON x.room_id = r.id
         WHERE x.status IN ('PROPOSED', 'VALIDATED')
         ORDER BY x.starts_at, x.id
         LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit], |row| {
        Ok(TimetableEntry {
            exam_id: row.get(0)?,
            starts_at: row.get(1)?,
            module: row.get(2)?,
            formation: row.get(3)?,
            department: row.get(4)?,
            professor: row.get(5)?,
            room: row.get(6)?,
            room_kind: row.get(7)?,
            capacity: row.get(8)?,
            duration_minutes: row.get(9)?,
            generation_mode: row.get(10)?,
            status: row.get(11)?,
        })
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Aggregate statistics over the active schedule.
pub fn schedule_statistics(conn: &Connection) -> Result<ScheduleStatistics> {
    let total_active: i64 = conn.query_row(
        "SELECT COUNT(*) FROM exams WHERE status IN ('PROPOSED', 'VALIDATED')",
        [],
        |row| row.get(0),
    )?;
    let proposed: i64 = conn.query_row(
        "SELECT COUNT(*) FROM exams WHERE status = 'PROPOSED'",
        [],
        |row| row.get(0),
    )?;
    let validated: i64 = conn.query_row(
        "SELECT COUNT(*) FROM exams WHERE status = 'VALIDATED'",
        [],
        |row| row.get(0),
    )?;
    let professors_in_use: i64 = conn.query_row(
        "SELECT COUNT(DISTINCT professor_id) FROM exams
         WHERE status IN ('PROPOSED', 'VALIDATED')",
        [],
        |row| row.get(0),
    )?;
    let rooms_in_use: i64 = conn.query_row(
        "SELECT COUNT(DISTINCT room_id) FROM exams
         WHERE status IN ('PROPOSED', 'VALIDATED')",
        [],
        |row| row.get(0),
    )?;

    let mut stmt = conn.prepare(
        "SELECT DATE(starts_at), COUNT(*) FROM exams
         WHERE status IN ('PROPOSED', 'VALIDATED')
         GROUP BY DATE(starts_at)
         ORDER BY DATE(starts_at)",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(DayCount {
            day: row.get(0)?,
            exams: row.get(1)?,
        })
    })?;
    let mut exams_per_day = Vec::new();
    for r in rows {
        exams_per_day.push(r?);
    }

    let mut stmt = conn.prepare(
        "SELECT d.name, COUNT(x.id)
         FROM exams x
         JOIN modules m ON x.module_id = m.id
         JOIN formations f ON m.formation_id = f.id
         JOIN departments d ON f.dept_id = d.id
         WHERE x.status IN ('PROPOSED', 'VALIDATED')
         GROUP BY d.id, d.name
         ORDER BY COUNT(x.id) DESC, d.name",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(DepartmentCount {
            department: row.get(0)?,
            exams: row.get(1)?,
        })
    })?;
    let mut exams_per_department = Vec::new();
    for r in rows {
        exams_per_department.push(r?);
    }

    let mut stmt = conn.prepare(
        "SELECT p.id, p.full_name, COUNT(x.id)
         FROM exams x
         JOIN professors p ON x.professor_id = p.id
         WHERE x.status IN ('PROPOSED', 'VALIDATED')
         GROUP BY p.id, p.full_name
         ORDER BY COUNT(x.id) DESC, p.id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(ProfessorLoad {
            professor_id: row.get(0)?,
            full_name: row.get(1)?,
            exams: row.get(2)?,
        })
    })?;
    let mut professor_load = Vec::new();
    for r in rows {
        professor_load.push(r?);
    }

    Ok(ScheduleStatistics {
        total_active,
        proposed,
        validated,
        professors_in_use,
        rooms_in_use,
        exams_per_day,
        exams_per_department,
        professor_load,
    })
}
