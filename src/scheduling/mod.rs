//! The scheduling/conflict engine: assignment generation, conflict
//! detection, greedy resolution and the validation gate. Every operation
//! runs inside a single store transaction, committed at the end and rolled
//! back on error; that is the one transaction discipline of the engine.

use rand::SeedableRng;
use rand::rngs::SmallRng;

pub mod conflict;
pub mod generator;
pub mod optimizer;
pub mod slots;
pub mod validation;

pub use conflict::{conflict_details, conflict_pairs, count_conflicts, find_conflicts};
pub use generator::{GenerateOptions, generate_schedule};
pub use optimizer::optimize_schedule;
pub use validation::{ManualExamRequest, add_manual_exam, reset_schedule, validate_schedule};

/// Deterministic RNG when a seed is supplied, OS-seeded otherwise. Every
/// random pick in the engine goes through one of these so outcomes are
/// reproducible in tests.
pub(crate) fn seeded_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => SmallRng::from_os_rng(),
    }
}
