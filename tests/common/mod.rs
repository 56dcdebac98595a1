#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{Connection, params};

use examplan::models::GenerationMode;
use examplan::store;
use examplan::store::exams::NewExam;

pub fn test_store() -> Connection {
    store::open_in_memory().unwrap()
}

pub fn seed_department(conn: &Connection, id: i64, name: &str) {
    conn.execute(
        "INSERT INTO departments (id, name) VALUES (?1, ?2)",
        params![id, name],
    )
    .unwrap();
}

pub fn seed_formation(conn: &Connection, id: i64, name: &str, dept_id: i64) {
    conn.execute(
        "INSERT INTO formations (id, name, dept_id) VALUES (?1, ?2, ?3)",
        params![id, name, dept_id],
    )
    .unwrap();
}

pub fn seed_module(conn: &Connection, id: i64, name: &str, formation_id: i64, enrolled: i64) {
    conn.execute(
        "INSERT INTO modules (id, name, formation_id) VALUES (?1, ?2, ?3)",
        params![id, name, formation_id],
    )
    .unwrap();
    for i in 0..enrolled {
        conn.execute(
            "INSERT INTO enrollments (module_id, student_id) VALUES (?1, ?2)",
            params![id, id * 10_000 + i],
        )
        .unwrap();
    }
}

pub fn seed_professor(conn: &Connection, id: i64, name: &str, dept_id: i64) {
    conn.execute(
        "INSERT INTO professors (id, full_name, dept_id) VALUES (?1, ?2, ?3)",
        params![id, name, dept_id],
    )
    .unwrap();
}

pub fn seed_room(conn: &Connection, id: i64, name: &str, kind: &str, capacity: i64) {
    conn.execute(
        "INSERT INTO rooms (id, name, kind, capacity) VALUES (?1, ?2, ?3, ?4)",
        params![id, name, kind, capacity],
    )
    .unwrap();
}

/// A department with one formation, `modules` modules of 20 students each,
/// `professors` professors and `rooms` rooms of capacity 30.
pub fn seed_small_campus(conn: &Connection, modules: i64, professors: i64, rooms: i64) {
    seed_department(conn, 1, "Computer Science");
    seed_formation(conn, 1, "BSc Computer Science", 1);
    for m in 1..=modules {
        seed_module(conn, m, &format!("Module {}", m), 1, 20);
    }
    for p in 1..=professors {
        seed_professor(conn, p, &format!("Prof {}", p), 1);
    }
    for r in 1..=rooms {
        seed_room(conn, r, &format!("Room {}", r), "STANDARD", 30);
    }
}

pub fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(h, mi, 0)
        .unwrap()
}

/// Insert an AUTO/PROPOSED exam directly, bypassing generation, to build a
/// precise schedule state.
pub fn place_exam(
    conn: &Connection,
    module_id: i64,
    professor_id: i64,
    room_id: i64,
    starts_at: NaiveDateTime,
) -> i64 {
    store::exams::insert_exam(
        conn,
        &NewExam {
            module_id,
            professor_id,
            room_id,
            starts_at,
            duration_minutes: 120,
            generation_mode: GenerationMode::Auto,
            created_by: "test",
        },
    )
    .unwrap()
}

pub fn exam_status(conn: &Connection, exam_id: i64) -> String {
    conn.query_row(
        "SELECT status FROM exams WHERE id = ?1",
        params![exam_id],
        |row| row.get(0),
    )
    .unwrap()
}
