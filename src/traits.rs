//! Seams to the tracker's external collaborators.

use async_trait::async_trait;

use crate::domain::{ContestId, ContestPointer, GameSnapshot, OutputUnit};
use crate::error::{FeedError, Result};

/// Holds the operator-selected contest. Read-only, re-read on every check.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContestSource: Send + Sync {
    async fn current(&self) -> Result<ContestPointer>;
}

/// Fetches one box-score snapshot per poll.
///
/// Provider-level errors come back as a degenerate snapshot with
/// `error_text` set; only network and parse failures are `Err`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedClient: Send + Sync {
    async fn fetch(&self, contest_id: &ContestId) -> std::result::Result<GameSnapshot, FeedError>;
}

/// Durable, duplicate-tolerant destination for output units
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentSink: Send + Sync {
    async fn deliver(&self, unit: &OutputUnit) -> Result<()>;
}

/// Builds the opaque pre/post-game text bundles, one block per unit.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BundleFormatter: Send + Sync {
    async fn pregame_bundle(&self, contest_id: &ContestId) -> Result<Vec<String>>;

    async fn postgame_bundle(&self, contest_id: &ContestId) -> Result<Vec<String>>;
}
