pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod tracker;
pub mod traits;

pub use config::AppConfig;
pub use domain::{
    ContestId, ContestPointer, GamePhase, GameSnapshot, OutputUnit, ScoringPlayRecord,
    TrackerState,
};
pub use error::{FailureKind, FeedError, GridcastError, Result};
pub use services::TrackerMetrics;
pub use tracker::{CycleOutcome, GameTracker, PhaseClassifier, ScoringPlayDiffer, SequenceEmitter};
pub use traits::{BundleFormatter, ContentSink, ContestSource, FeedClient};
