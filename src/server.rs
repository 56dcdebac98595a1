//! JSON HTTP API over the scheduling engine. One route per engine
//! operation; every response carries `success`, a human-readable `message`
//! and the operation's metrics. Access to the single store connection is
//! serialized behind a mutex (single-writer model).

use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, web};
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::json;

use crate::error::ScheduleError;
use crate::models::{DATETIME_FORMAT, OptimizeMode};
use crate::scheduling::conflict::DETAIL_PAGE_SIZE;
use crate::scheduling::{
    GenerateOptions, ManualExamRequest, add_manual_exam, conflict_details, count_conflicts,
    generate_schedule, optimize_schedule, reset_schedule, validate_schedule,
};
use crate::store;

type Db = web::Data<Mutex<rusqlite::Connection>>;

/// Map an engine failure onto an HTTP response. Exhausted catalogs and
/// blocked validations are reportable outcomes, not transport errors.
fn failure_response(e: ScheduleError) -> HttpResponse {
    match e {
        ScheduleError::ResourceExhausted { .. } | ScheduleError::ConflictPresent { .. } => {
            HttpResponse::Ok().json(json!({"success": false, "message": e.to_string()}))
        }
        ScheduleError::ConstraintViolation { .. } => {
            HttpResponse::BadRequest().json(json!({"success": false, "message": e.to_string()}))
        }
        ScheduleError::Store(_) => {
            tracing::error!(error = %e, "store failure");
            HttpResponse::InternalServerError()
                .json(json!({"success": false, "message": e.to_string()}))
        }
    }
}

fn lock_failure() -> HttpResponse {
    HttpResponse::InternalServerError()
        .json(json!({"success": false, "message": "store lock poisoned"}))
}

#[derive(Deserialize)]
struct GenerateRequest {
    count: Option<usize>,
    duration_minutes: Option<i64>,
    days_ahead: Option<u32>,
    seed: Option<u64>,
}

async fn generate_handler(state: Db, body: web::Json<GenerateRequest>) -> impl Responder {
    let req = body.into_inner();
    let opts = GenerateOptions {
        target_count: req.count.unwrap_or(50),
        duration_minutes: req.duration_minutes.unwrap_or(120),
        days_ahead: req.days_ahead.unwrap_or(30),
        start_from: None,
        seed: req.seed,
    };
    let mut conn = match state.lock() {
        Ok(c) => c,
        Err(_) => return lock_failure(),
    };
    match generate_schedule(&mut conn, &opts) {
        Ok(report) => HttpResponse::Ok().json(json!({
            "success": report.scheduled > 0,
            "message": format!("{} exam(s) scheduled ({} failed)", report.scheduled, report.failed),
            "metrics": report,
        })),
        Err(e) => failure_response(e),
    }
}

async fn conflicts_count_handler(state: Db) -> impl Responder {
    let conn = match state.lock() {
        Ok(c) => c,
        Err(_) => return lock_failure(),
    };
    match count_conflicts(&conn) {
        Ok(n) => HttpResponse::Ok().json(json!({
            "success": true,
            "message": format!("{} exam(s) in conflict", n),
            "conflicts": n,
        })),
        Err(e) => failure_response(e),
    }
}

/// Query param: ?limit=20
async fn conflicts_details_handler(
    state: Db,
    query: web::Query<std::collections::HashMap<String, String>>,
) -> impl Responder {
    let limit = query
        .get("limit")
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DETAIL_PAGE_SIZE);
    let conn = match state.lock() {
        Ok(c) => c,
        Err(_) => return lock_failure(),
    };
    match conflict_details(&conn, limit) {
        Ok(details) => HttpResponse::Ok().json(json!({
            "success": true,
            "count": details.len(),
            "conflicts": details,
        })),
        Err(e) => failure_response(e),
    }
}

#[derive(Deserialize)]
struct OptimizeRequest {
    mode: Option<String>,
    seed: Option<u64>,
}

async fn optimize_handler(state: Db, body: web::Json<OptimizeRequest>) -> impl Responder {
    let req = body.into_inner();
    let mode = match req.mode.as_deref() {
        None => OptimizeMode::Fast,
        Some(s) => match OptimizeMode::parse(s) {
            Some(m) => m,
            None => {
                return HttpResponse::BadRequest().json(json!({
                    "success": false,
                    "message": format!("unknown optimize mode: {}", s),
                }));
            }
        },
    };
    let mut conn = match state.lock() {
        Ok(c) => c,
        Err(_) => return lock_failure(),
    };
    match optimize_schedule(&mut conn, mode, req.seed) {
        Ok(report) => HttpResponse::Ok().json(json!({
            "success": true,
            "message": format!(
                "{} conflict(s) resolved, {} exam(s) still in conflict",
                report.resolved, report.remaining
            ),
            "metrics": report,
        })),
        Err(e) => failure_response(e),
    }
}

#[derive(Deserialize)]
struct ValidateRequest {
    actor: Option<String>,
}

async fn validate_handler(state: Db, body: web::Json<ValidateRequest>) -> impl Responder {
    let actor = body.into_inner().actor.unwrap_or_else(|| "administrator".to_string());
    let mut conn = match state.lock() {
        Ok(c) => c,
        Err(_) => return lock_failure(),
    };
    match validate_schedule(&mut conn, &actor) {
        Ok(report) => HttpResponse::Ok().json(json!({
            "success": true,
            "message": report.message,
            "metrics": {"validated": report.validated},
        })),
        Err(e) => failure_response(e),
    }
}

#[derive(Deserialize)]
struct ManualRequest {
    module_id: i64,
    professor_id: i64,
    room_id: i64,
    starts_at: String,
    duration_minutes: Option<i64>,
}

async fn manual_handler(state: Db, body: web::Json<ManualRequest>) -> impl Responder {
    let req = body.into_inner();
    let starts_at = match NaiveDateTime::parse_from_str(&req.starts_at, DATETIME_FORMAT) {
        Ok(dt) => dt,
        Err(e) => {
            return HttpResponse::BadRequest().json(json!({
                "success": false,
                "message": format!("invalid starts_at (expected YYYY-MM-DD HH:MM:SS): {}", e),
            }));
        }
    };
    let mut conn = match state.lock() {
        Ok(c) => c,
        Err(_) => return lock_failure(),
    };
    let manual = ManualExamRequest {
        module_id: req.module_id,
        professor_id: req.professor_id,
        room_id: req.room_id,
        starts_at,
        duration_minutes: req.duration_minutes.unwrap_or(120),
    };
    match add_manual_exam(&mut conn, &manual) {
        Ok(id) => HttpResponse::Ok().json(json!({
            "success": true,
            "message": format!("exam added (id: {})", id),
            "metrics": {"exam_id": id},
        })),
        Err(e) => failure_response(e),
    }
}

#[derive(Deserialize)]
struct ResetRequest {
    actor: Option<String>,
}

async fn reset_handler(state: Db, body: web::Json<ResetRequest>) -> impl Responder {
    let actor = body.into_inner().actor.unwrap_or_else(|| "administrator".to_string());
    let mut conn = match state.lock() {
        Ok(c) => c,
        Err(_) => return lock_failure(),
    };
    match reset_schedule(&mut conn, &actor) {
        Ok(cancelled) => HttpResponse::Ok().json(json!({
            "success": true,
            "message": format!("{} exam(s) cancelled", cancelled),
            "metrics": {"cancelled": cancelled},
        })),
        Err(e) => failure_response(e),
    }
}

/// Query param: ?limit=100
async fn timetable_handler(
    state: Db,
    query: web::Query<std::collections::HashMap<String, String>>,
) -> impl Responder {
    let limit = query
        .get("limit")
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(100);
    let conn = match state.lock() {
        Ok(c) => c,
        Err(_) => return lock_failure(),
    };
    match store::exams::timetable(&conn, limit) {
        Ok(entries) => HttpResponse::Ok().json(json!({
            "success": true,
            "count": entries.len(),
            "timetable": entries,
        })),
        Err(e) => failure_response(e),
    }
}

async fn stats_handler(state: Db) -> impl Responder {
    let conn = match state.lock() {
        Ok(c) => c,
        Err(_) => return lock_failure(),
    };
    match store::exams::schedule_statistics(&conn) {
        Ok(stats) => HttpResponse::Ok().json(json!({"success": true, "stats": stats})),
        Err(e) => failure_response(e),
    }
}

async fn help_handler() -> impl Responder {
    let help = json!({
        "description": "Exam scheduling API: batch generation, conflict detection, greedy resolution and schedule validation.",
        "endpoints": {
            "POST /schedule/generate": {"count": 50, "duration_minutes": 120, "days_ahead": 30, "seed": null},
            "GET /conflicts/count": "number of exams in conflict",
            "GET /conflicts/details?limit=20": "conflict pairs with names",
            "POST /schedule/optimize": {"mode": "FAST|FULL", "seed": null},
            "POST /schedule/validate": {"actor": "administrator"},
            "POST /schedule/manual": {"module_id": 1, "professor_id": 1, "room_id": 1, "starts_at": "2026-09-07 08:30:00", "duration_minutes": 120},
            "POST /schedule/reset": {"actor": "administrator"},
            "GET /schedule/timetable?limit=100": "active exams with catalog names",
            "GET /schedule/stats": "aggregate schedule statistics",
        },
        "note": "Generation does not check occupancy; run optimize then validate to publish a conflict-free schedule.",
    });
    HttpResponse::Ok().json(help)
}

pub async fn run_server(bind_addr: &str) -> std::io::Result<()> {
    let conn = store::open_store().map_err(|e| std::io::Error::other(e.to_string()))?;
    let data = web::Data::new(Mutex::new(conn));
    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(Cors::permissive())
            .route("/schedule/generate", web::post().to(generate_handler))
            .route("/conflicts/count", web::get().to(conflicts_count_handler))
            .route("/conflicts/details", web::get().to(conflicts_details_handler))
            .route("/schedule/optimize", web::post().to(optimize_handler))
            .route("/schedule/validate", web::post().to(validate_handler))
            .route("/schedule/manual", web::post().to(manual_handler))
            .route("/schedule/reset", web::post().to(reset_handler))
            .route("/schedule/timetable", web::get().to(timetable_handler))
            .route("/schedule/stats", web::get().to(stats_handler))
            .route("/help", web::get().to(help_handler))
    })
    .workers(num_cpus::get().min(4))
    .bind(bind_addr)?
    .run()
    .await
}
