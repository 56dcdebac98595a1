//! Manual exam entry, the administrative reset and validation idempotence.

mod common;

use common::{dt, exam_status, place_exam, seed_small_campus, test_store};
use examplan::ScheduleError;
use examplan::scheduling::{ManualExamRequest, add_manual_exam, reset_schedule, validate_schedule};
use examplan::store::catalog::unscheduled_modules;
use examplan::store::exams::{active_exam_slots, get_exam};

fn request(module_id: i64, room_id: i64) -> ManualExamRequest {
    ManualExamRequest {
        module_id,
        professor_id: 1,
        room_id,
        starts_at: dt(2026, 9, 7, 8, 30),
        duration_minutes: 90,
    }
}

#[test]
fn manual_exam_is_inserted_as_proposed_manual() {
    let mut conn = test_store();
    seed_small_campus(&conn, 2, 2, 2);

    let id = add_manual_exam(&mut conn, &request(1, 1)).unwrap();
    let exam = get_exam(&conn, id).unwrap().unwrap();
    assert_eq!(exam.module_id, 1);
    assert_eq!(exam.duration_minutes, 90);
    assert_eq!(exam.generation_mode.as_str(), "MANUAL");
    assert_eq!(exam.status.as_str(), "PROPOSED");
}

#[test]
fn manual_exam_refuses_a_module_that_already_has_one() {
    let mut conn = test_store();
    seed_small_campus(&conn, 2, 2, 2);
    add_manual_exam(&mut conn, &request(1, 1)).unwrap();

    let err = add_manual_exam(&mut conn, &request(1, 2)).unwrap_err();
    assert!(matches!(err, ScheduleError::ConstraintViolation { .. }));
    assert!(err.to_string().contains("module 1"));
}

#[test]
fn manual_exam_refuses_an_occupied_room() {
    let mut conn = test_store();
    seed_small_campus(&conn, 2, 2, 2);
    add_manual_exam(&mut conn, &request(1, 1)).unwrap();

    // same room, same instant, different module
    let err = add_manual_exam(&mut conn, &request(2, 1)).unwrap_err();
    assert!(matches!(err, ScheduleError::ConstraintViolation { .. }));
    assert!(err.to_string().contains("room 1"));
}

#[test]
fn manual_exam_refuses_unknown_references() {
    let mut conn = test_store();
    seed_small_campus(&conn, 1, 1, 1);

    let err = add_manual_exam(&mut conn, &request(99, 1)).unwrap_err();
    assert!(err.to_string().contains("unknown module"));

    let err = add_manual_exam(
        &mut conn,
        &ManualExamRequest {
            professor_id: 99,
            ..request(1, 1)
        },
    )
    .unwrap_err();
    assert!(err.to_string().contains("unknown professor"));

    let err = add_manual_exam(&mut conn, &request(1, 99)).unwrap_err();
    assert!(err.to_string().contains("unknown room"));
}

#[test]
fn cancelled_exams_free_their_module_again() {
    let mut conn = test_store();
    seed_small_campus(&conn, 3, 2, 2);
    let a = place_exam(&conn, 1, 1, 1, dt(2026, 9, 7, 8, 30));
    let b = place_exam(&conn, 2, 2, 2, dt(2026, 9, 8, 10, 45));
    assert_eq!(unscheduled_modules(&conn, -1).unwrap().len(), 1);

    let cancelled = reset_schedule(&mut conn, "admin").unwrap();
    assert_eq!(cancelled, 2);
    assert_eq!(exam_status(&conn, a), "CANCELLED");
    assert_eq!(exam_status(&conn, b), "CANCELLED");
    assert!(active_exam_slots(&conn).unwrap().is_empty());
    // every module is schedulable again
    assert_eq!(unscheduled_modules(&conn, -1).unwrap().len(), 3);
}

#[test]
fn reset_on_an_empty_schedule_cancels_nothing() {
    let mut conn = test_store();
    seed_small_campus(&conn, 1, 1, 1);
    assert_eq!(reset_schedule(&mut conn, "admin").unwrap(), 0);
}

#[test]
fn validate_twice_is_a_no_op_success() {
    let mut conn = test_store();
    seed_small_campus(&conn, 2, 2, 2);
    place_exam(&conn, 1, 1, 1, dt(2026, 9, 7, 8, 30));
    place_exam(&conn, 2, 2, 2, dt(2026, 9, 7, 10, 45));

    let first = validate_schedule(&mut conn, "admin").unwrap();
    assert_eq!(first.validated, 2);

    let second = validate_schedule(&mut conn, "admin").unwrap();
    assert_eq!(second.validated, 0);
    assert!(second.message.contains("already validated"));
}

#[test]
fn a_cancelled_exam_does_not_conflict_with_anything() {
    let mut conn = test_store();
    seed_small_campus(&conn, 2, 2, 1);
    let t = dt(2026, 9, 7, 8, 30);
    place_exam(&conn, 1, 1, 1, t);
    let b = place_exam(&conn, 2, 2, 1, t);
    conn.execute(
        "UPDATE exams SET status = 'CANCELLED' WHERE id = ?1",
        rusqlite::params![b],
    )
    .unwrap();

    assert_eq!(examplan::scheduling::count_conflicts(&conn).unwrap(), 0);
    // with the conflict gone, validation promotes the surviving exam
    let report = validate_schedule(&mut conn, "admin").unwrap();
    assert_eq!(report.validated, 1);
}
