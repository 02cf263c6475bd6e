//! Contest phase classification.
//!
//! The feed's status field is unreliable before kickoff, so SCHEDULED comes
//! from the "not started" marker inside the provider error text. FINAL needs
//! the explicit completed token. Everything else, provider errors included,
//! is IN_PROGRESS; a provider error must never read as FINAL.

use crate::config::FeedConfig;
use crate::domain::{GamePhase, GameSnapshot};

#[derive(Debug, Clone)]
pub struct PhaseClassifier {
    /// Lowercased for substring matching
    not_started_marker: String,
    completed_status: String,
}

impl PhaseClassifier {
    pub fn new(not_started_marker: &str, completed_status: &str) -> Self {
        Self {
            not_started_marker: not_started_marker.trim().to_lowercase(),
            completed_status: completed_status.trim().to_string(),
        }
    }

    pub fn from_config(feed: &FeedConfig) -> Self {
        Self::new(&feed.not_started_marker, &feed.completed_status)
    }

    pub fn classify(&self, snapshot: &GameSnapshot) -> GamePhase {
        if self.is_not_started(snapshot) {
            return GamePhase::Scheduled;
        }

        let completed = snapshot
            .raw_status_text
            .as_deref()
            .map(|s| s.trim().eq_ignore_ascii_case(&self.completed_status))
            .unwrap_or(false);

        if completed {
            GamePhase::Final
        } else {
            GamePhase::InProgress
        }
    }

    fn is_not_started(&self, snapshot: &GameSnapshot) -> bool {
        if self.not_started_marker.is_empty() {
            return false;
        }
        snapshot
            .error_text
            .as_deref()
            .map(|text| text.to_lowercase().contains(&self.not_started_marker))
            .unwrap_or(false)
    }
}

impl Default for PhaseClassifier {
    fn default() -> Self {
        Self::new("Game hasn't started", "Completed")
    }
}
