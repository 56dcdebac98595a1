use thiserror::Error;

/// Failure taxonomy of the scheduling engine.
///
/// `ResourceExhausted` and `ConflictPresent` are reportable outcomes (the
/// operation ran, the schedule state blocked it); `ConstraintViolation` and
/// `Store` are genuine errors.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The catalog has nothing left to work with (modules, rooms,
    /// professors or timeslots).
    #[error("no {what} available")]
    ResourceExhausted { what: &'static str },

    /// A write was rejected before or by the store.
    #[error("constraint violation: {reason}")]
    ConstraintViolation { reason: String },

    /// Validation blocked by outstanding conflicts.
    #[error("{conflicts} conflict(s) detected - validation blocked")]
    ConflictPresent { conflicts: usize },

    /// Connectivity or transaction failure in the underlying store.
    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
