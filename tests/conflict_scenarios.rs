//! Conflict detection, resolution and validation against hand-built
//! schedule states.

mod common;

use common::{dt, exam_status, place_exam, seed_small_campus, test_store};
use examplan::ScheduleError;
use examplan::models::{ConflictKind, OptimizeMode};
use examplan::scheduling::{
    conflict_details, count_conflicts, optimize_schedule, validate_schedule,
};
use examplan::store::exams::get_exam;

#[test]
fn two_exams_in_one_room_make_one_room_conflict_pair() {
    let conn = test_store();
    seed_small_campus(&conn, 2, 2, 1);
    let t = dt(2026, 9, 7, 8, 30);
    let a = place_exam(&conn, 1, 1, 1, t);
    let b = place_exam(&conn, 2, 2, 1, t);

    let details = conflict_details(&conn, 20).unwrap();
    assert_eq!(details.len(), 1);
    assert_eq!(details[0].kind, ConflictKind::RoomConflict);
    assert_eq!((details[0].first_exam, details[0].second_exam), (a, b));

    // both exams participate in the conflict
    assert_eq!(count_conflicts(&conn).unwrap(), 2);
}

#[test]
fn fast_pass_moves_one_exam_to_the_free_room() {
    let mut conn = test_store();
    seed_small_campus(&conn, 2, 2, 2);
    let t = dt(2026, 9, 7, 8, 30);
    let a = place_exam(&conn, 1, 1, 1, t);
    let b = place_exam(&conn, 2, 2, 1, t);

    let report = optimize_schedule(&mut conn, OptimizeMode::Fast, Some(7)).unwrap();
    assert_eq!(report.conflicts_before, 2);
    assert_eq!(report.resolved, 1);
    assert_eq!(report.remaining, 0);
    assert_eq!(count_conflicts(&conn).unwrap(), 0);

    // exactly one of the two changed rooms, and it is the later exam
    let room_a = get_exam(&conn, a).unwrap().unwrap().room_id;
    let room_b = get_exam(&conn, b).unwrap().unwrap().room_id;
    assert_eq!(room_a, 1);
    assert_eq!(room_b, 2);
    assert_eq!(
        get_exam(&conn, b).unwrap().unwrap().last_modified_by.as_deref(),
        Some("optimizer")
    );
}

#[test]
fn fast_pass_leaves_unresolvable_conflicts_in_place() {
    let mut conn = test_store();
    // a single room: nowhere to move anything
    seed_small_campus(&conn, 2, 2, 1);
    let t = dt(2026, 9, 7, 8, 30);
    place_exam(&conn, 1, 1, 1, t);
    place_exam(&conn, 2, 2, 1, t);

    let report = optimize_schedule(&mut conn, OptimizeMode::Fast, Some(7)).unwrap();
    assert_eq!(report.resolved, 0);
    assert_eq!(report.remaining, 2);
    assert_eq!(count_conflicts(&conn).unwrap(), 2);
}

#[test]
fn full_pass_rebalances_an_overloaded_professor() {
    let mut conn = test_store();
    seed_small_campus(&conn, 5, 2, 5);
    // professor 1 carries five exams at five different times: overloaded,
    // but conflict-free
    for m in 1..=5 {
        place_exam(&conn, m, 1, m, dt(2026, 9, 7 + m as u32, 8, 30));
    }
    assert_eq!(count_conflicts(&conn).unwrap(), 0);

    let report = optimize_schedule(&mut conn, OptimizeMode::Full, Some(7)).unwrap();
    assert_eq!(report.rebalanced, 1);

    let moved: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM exams WHERE professor_id = 2 AND status != 'CANCELLED'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(moved, 1);
}

#[test]
fn fast_pass_does_not_rebalance_professors() {
    let mut conn = test_store();
    seed_small_campus(&conn, 5, 2, 5);
    for m in 1..=5 {
        place_exam(&conn, m, 1, m, dt(2026, 9, 7 + m as u32, 8, 30));
    }

    let report = optimize_schedule(&mut conn, OptimizeMode::Fast, Some(7)).unwrap();
    assert_eq!(report.rebalanced, 0);
    let still_owned: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM exams WHERE professor_id = 1 AND status != 'CANCELLED'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(still_owned, 5);
}

#[test]
fn validate_is_blocked_while_a_conflict_remains() {
    let mut conn = test_store();
    seed_small_campus(&conn, 2, 2, 1);
    let t = dt(2026, 9, 7, 8, 30);
    let a = place_exam(&conn, 1, 1, 1, t);
    let b = place_exam(&conn, 2, 2, 1, t);

    let err = validate_schedule(&mut conn, "admin").unwrap_err();
    match err {
        ScheduleError::ConflictPresent { conflicts } => {
            assert_eq!(conflicts, 2);
            assert!(err.to_string().contains("2 conflict(s)"));
        }
        other => panic!("expected ConflictPresent, got {:?}", other),
    }

    // nothing transitioned
    assert_eq!(exam_status(&conn, a), "PROPOSED");
    assert_eq!(exam_status(&conn, b), "PROPOSED");
}

#[test]
fn validate_promotes_everything_once_conflicts_are_gone() {
    let mut conn = test_store();
    seed_small_campus(&conn, 2, 2, 2);
    let t = dt(2026, 9, 7, 8, 30);
    let a = place_exam(&conn, 1, 1, 1, t);
    let b = place_exam(&conn, 2, 2, 1, t);

    optimize_schedule(&mut conn, OptimizeMode::Fast, Some(7)).unwrap();
    let report = validate_schedule(&mut conn, "admin").unwrap();
    assert_eq!(report.validated, 2);
    assert_eq!(count_conflicts(&conn).unwrap(), 0);
    assert_eq!(exam_status(&conn, a), "VALIDATED");
    assert_eq!(exam_status(&conn, b), "VALIDATED");
    assert_eq!(
        get_exam(&conn, a).unwrap().unwrap().last_modified_by.as_deref(),
        Some("admin")
    );
}

#[test]
fn professor_double_booking_is_detected_and_survives_fast_pass() {
    let mut conn = test_store();
    seed_small_campus(&conn, 2, 2, 2);
    let t = dt(2026, 9, 7, 10, 45);
    place_exam(&conn, 1, 1, 1, t);
    place_exam(&conn, 2, 1, 2, t);

    let details = conflict_details(&conn, 20).unwrap();
    assert_eq!(details.len(), 1);
    assert_eq!(details[0].kind, ConflictKind::ProfessorConflict);

    // the room pass only targets room conflicts; the professor conflict
    // remains, but never grows
    let report = optimize_schedule(&mut conn, OptimizeMode::Fast, Some(7)).unwrap();
    assert_eq!(report.resolved, 0);
    assert_eq!(report.remaining, 2);
}

#[test]
fn detail_listing_respects_the_page_size() {
    let conn = test_store();
    seed_small_campus(&conn, 6, 6, 3);
    let t = dt(2026, 9, 7, 8, 30);
    // three rooms, each double-booked: three pairs
    place_exam(&conn, 1, 1, 1, t);
    place_exam(&conn, 2, 2, 1, t);
    place_exam(&conn, 3, 3, 2, t);
    place_exam(&conn, 4, 4, 2, t);
    place_exam(&conn, 5, 5, 3, t);
    place_exam(&conn, 6, 6, 3, t);

    assert_eq!(conflict_details(&conn, 20).unwrap().len(), 3);
    assert_eq!(conflict_details(&conn, 2).unwrap().len(), 2);
}
