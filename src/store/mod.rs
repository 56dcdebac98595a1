use rusqlite::Connection;
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::error::Result;

pub mod catalog;
pub mod exams;

// load .env at module init if present
fn load_dotenv() {
    let _ = dotenv::dotenv();
}

/// Return the path to the scheduling DB. Honors EXAMPLAN_DB_PATH /
/// EXAMPLAN_DB_URL env (sqlite:// and file:// schemes supported).
pub fn db_path() -> PathBuf {
    load_dotenv();
    if let Ok(p) = env::var("EXAMPLAN_DB_PATH") {
        PathBuf::from(p)
    } else if let Ok(p) = env::var("EXAMPLAN_DB_URL") {
        if p.starts_with("sqlite://") {
            PathBuf::from(p.trim_start_matches("sqlite://"))
        } else if p.starts_with("file://") {
            PathBuf::from(p.trim_start_matches("file://"))
        } else {
            PathBuf::from("data/examplan.db")
        }
    } else {
        PathBuf::from("data/examplan.db")
    }
}

/// Open the scheduling DB file (creating its directory if needed) and make
/// sure the schema exists.
pub fn open_store() -> Result<Connection> {
    let path = db_path();
    if let Some(dir) = path.parent() {
        if !dir.exists() {
            let _ = fs::create_dir_all(dir);
        }
    }
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    Ok(conn)
}

/// In-memory store with the full schema, used by tests.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

/// Create all tables and indexes if they do not exist yet.
///
/// The partial unique index mirrors the one-active-exam-per-module invariant
/// at store level; the engine also enforces it before inserting and tolerates
/// the index rejecting a row.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS departments (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS formations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            dept_id INTEGER NOT NULL REFERENCES departments(id)
        );

        CREATE TABLE IF NOT EXISTS modules (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            formation_id INTEGER NOT NULL REFERENCES formations(id)
        );

        CREATE TABLE IF NOT EXISTS enrollments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            module_id INTEGER NOT NULL REFERENCES modules(id),
            student_id INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS professors (
            id INTEGER PRIMARY KEY,
            full_name TEXT NOT NULL,
            dept_id INTEGER NOT NULL REFERENCES departments(id)
        );

        CREATE TABLE IF NOT EXISTS rooms (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            capacity INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS exams (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            module_id INTEGER NOT NULL REFERENCES modules(id),
            professor_id INTEGER NOT NULL REFERENCES professors(id),
            room_id INTEGER NOT NULL REFERENCES rooms(id),
            starts_at TEXT NOT NULL,
            duration_minutes INTEGER NOT NULL,
            generation_mode TEXT NOT NULL,
            status TEXT NOT NULL,
            priority INTEGER NOT NULL DEFAULT 1,
            last_modified_by TEXT
        );

        CREATE UNIQUE INDEX IF NOT EXISTS ux_exams_active_module
            ON exams(module_id) WHERE status != 'CANCELLED';
        CREATE INDEX IF NOT EXISTS ix_exams_room_time
            ON exams(room_id, starts_at);
        CREATE INDEX IF NOT EXISTS ix_exams_prof_time
            ON exams(professor_id, starts_at);",
    )?;
    Ok(())
}
