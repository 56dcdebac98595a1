//! Read-only catalog queries. Departments, formations, modules, enrollments,
//! professors and rooms are created by out-of-scope data setup; the engine
//! only ever reads them.

use rusqlite::{Connection, params};

use crate::error::Result;
use crate::models::{ModuleInfo, Professor, Room, RoomKind};

/// Modules without any active (non-CANCELLED) exam, with their enrollment
/// count and owning department. A negative `limit` means no limit.
pub fn unscheduled_modules(conn: &Connection, limit: i64) -> Result<Vec<ModuleInfo>> {
    let mut stmt = conn.prepare(
        "SELECT m.id, m.name,
                (SELECT COUNT(*) FROM enrollments e WHERE e.module_id = m.id),
                f.dept_id
         FROM modules m
         JOIN formations f ON m.formation_id = f.id
         WHERE NOT EXISTS (
             SELECT 1 FROM exams x
             WHERE x.module_id = m.id AND x.status != 'CANCELLED'
         )
         ORDER BY m.id
         LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit], |row| {
        Ok(ModuleInfo {
            id: row.get(0)?,
            name: row.get(1)?,
            enrolled_count: row.get(2)?,
            dept_id: row.get(3)?,
        })
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// All rooms, smallest capacity first (the order the generator and the
/// resolver search in).
pub fn list_rooms(conn: &Connection) -> Result<Vec<Room>> {
    let mut stmt =
        conn.prepare("SELECT id, name, kind, capacity FROM rooms ORDER BY capacity, id")?;
    let rows = stmt.query_map([], |row| {
        let kind: String = row.get(2)?;
        Ok(Room {
            id: row.get(0)?,
            name: row.get(1)?,
            kind: RoomKind::parse(&kind).unwrap_or(RoomKind::Standard),
            capacity: row.get(3)?,
        })
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn list_professors(conn: &Connection) -> Result<Vec<Professor>> {
    let mut stmt = conn.prepare("SELECT id, full_name, dept_id FROM professors ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(Professor {
            id: row.get(0)?,
            full_name: row.get(1)?,
            dept_id: row.get(2)?,
        })
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Existence checks used by manual scheduling before inserting.
pub fn module_exists(conn: &Connection, module_id: i64) -> Result<bool> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM modules WHERE id = ?1",
        params![module_id],
        |row| row.get(0),
    )?;
    Ok(n > 0)
}

pub fn professor_exists(conn: &Connection, professor_id: i64) -> Result<bool> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM professors WHERE id = ?1",
        params![professor_id],
        |row| row.get(0),
    )?;
    Ok(n > 0)
}

pub fn room_exists(conn: &Connection, room_id: i64) -> Result<bool> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM rooms WHERE id = ?1",
        params![room_id],
        |row| row.get(0),
    )?;
    Ok(n > 0)
}
