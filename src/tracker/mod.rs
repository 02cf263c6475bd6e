//! Live contest tracker
//!
//! - `phase`: snapshot → SCHEDULED / IN_PROGRESS / FINAL
//! - `differ`: new scoring play detection without event ids
//! - `emitter` + `guard`: unit sequences with abort-on-contest-switch
//! - `runner`: the poll loop tying it together

pub mod differ;
pub mod emitter;
pub mod guard;
pub mod phase;
pub mod render;
pub mod runner;

pub use differ::{ScoringDiff, ScoringPlayDiffer};
pub use emitter::{EmitOutcome, SequenceEmitter};
pub use guard::{ContestGuard, GuardStatus};
pub use phase::PhaseClassifier;
pub use runner::{CycleOutcome, GameTracker};
