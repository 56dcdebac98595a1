// Core domain structures

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Storage format for exam timestamps (second resolution, local time).
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A course module still waiting for an exam, as read from the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleInfo {
    pub id: i64,
    pub name: String,
    /// Number of active registrations for this module.
    pub enrolled_count: i64,
    /// Department owning the module's formation.
    pub dept_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomKind {
    LectureHall,
    Standard,
    Lab,
}

impl RoomKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomKind::LectureHall => "LECTURE_HALL",
            RoomKind::Standard => "STANDARD",
            RoomKind::Lab => "LAB",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "LECTURE_HALL" => Some(RoomKind::LectureHall),
            "STANDARD" => Some(RoomKind::Standard),
            "LAB" => Some(RoomKind::Lab),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Room {
    pub id: i64,
    pub name: String,
    pub kind: RoomKind,
    pub capacity: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Professor {
    pub id: i64,
    pub full_name: String,
    pub dept_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExamStatus {
    Proposed,
    Validated,
    Cancelled,
}

impl ExamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExamStatus::Proposed => "PROPOSED",
            ExamStatus::Validated => "VALIDATED",
            ExamStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PROPOSED" => Some(ExamStatus::Proposed),
            "VALIDATED" => Some(ExamStatus::Validated),
            "CANCELLED" => Some(ExamStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenerationMode {
    Auto,
    Manual,
}

impl GenerationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::Auto => "AUTO",
            GenerationMode::Manual => "MANUAL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "AUTO" => Some(GenerationMode::Auto),
            "MANUAL" => Some(GenerationMode::Manual),
            _ => None,
        }
    }
}

/// A scheduled exam row, the only entity the engine creates and mutates.
#[derive(Debug, Clone)]
pub struct Exam {
    pub id: i64,
    pub module_id: i64,
    pub professor_id: i64,
    pub room_id: i64,
    pub starts_at: NaiveDateTime,
    pub duration_minutes: i64,
    pub generation_mode: GenerationMode,
    pub status: ExamStatus,
    pub priority: i64,
    pub last_modified_by: Option<String>,
}

/// The slice of an exam row the detector and resolver work on.
#[derive(Debug, Clone)]
pub struct ExamSlot {
    pub id: i64,
    pub module_id: i64,
    pub professor_id: i64,
    pub room_id: i64,
    pub starts_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictKind {
    RoomConflict,
    ProfessorConflict,
}

/// Two active exams double-booking a room or a professor at the same instant.
/// `first` always carries the smaller exam id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictPair {
    pub first: i64,
    pub second: i64,
    pub kind: ConflictKind,
    pub starts_at: NaiveDateTime,
}

/// A conflict pair joined with display names, for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct ConflictDetail {
    pub first_exam: i64,
    pub second_exam: i64,
    pub kind: ConflictKind,
    pub starts_at: String,
    pub first_module: String,
    pub second_module: String,
    pub first_professor: String,
    pub second_professor: String,
    /// Room of the first exam (the shared room for a room conflict).
    pub room: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptimizeMode {
    Fast,
    Full,
}

impl OptimizeMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "FAST" => Some(OptimizeMode::Fast),
            "FULL" => Some(OptimizeMode::Full),
            _ => None,
        }
    }
}

/// Outcome of one `generate_schedule` batch.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub requested: usize,
    /// Modules actually picked up (≤ requested).
    pub processed: usize,
    pub scheduled: usize,
    pub failed: usize,
    /// One truncated reason per failed module.
    pub failures: Vec<String>,
    pub elapsed_ms: u64,
}

/// Outcome of one `optimize_schedule` pass.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationReport {
    pub mode: OptimizeMode,
    /// Distinct exams in conflict before the pass.
    pub conflicts_before: usize,
    /// Room reassignments that went through.
    pub resolved: usize,
    /// Distinct exams still in conflict after the pass.
    pub remaining: usize,
    /// Exams moved off overloaded professors (FULL mode only).
    pub rebalanced: usize,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub validated: usize,
    pub message: String,
}

/// One row of the published timetable view.
#[derive(Debug, Clone, Serialize)]
pub struct TimetableEntry {
    pub exam_id: i64,
    pub starts_at: String,
    pub module: String,
    pub formation: String,
    pub department: String,
    pub professor: String,
    pub room: String,
    pub room_kind: String,
    pub capacity: i64,
    pub duration_minutes: i64,
    pub generation_mode: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayCount {
    pub day: String,
    pub exams: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DepartmentCount {
    pub department: String,
    pub exams: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfessorLoad {
    pub professor_id: i64,
    pub full_name: String,
    pub exams: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleStatistics {
    pub total_active: i64,
    pub proposed: i64,
    pub validated: i64,
    pub professors_in_use: i64,
    pub rooms_in_use: i64,
    pub exams_per_day: Vec<DayCount>,
    pub exams_per_department: Vec<DepartmentCount>,
    pub professor_load: Vec<ProfessorLoad>,
}
