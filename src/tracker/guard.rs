use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::ContestId;
use crate::traits::ContestSource;

/// What a pointer re-read found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardStatus {
    Active,
    /// Pointer names a different contest
    Switched,
    /// Pointer could not be read; the contest may be unchanged
    Unreadable,
}

/// Cooperative cancellation check for multi-unit sequences.
///
/// Captures the contest id at loop entry; a sequence continues only while
/// the contest pointer still names it. An unreadable pointer also stops the
/// sequence, but callers can tell it apart from a real switch.
#[derive(Clone)]
pub struct ContestGuard {
    source: Arc<dyn ContestSource>,
    contest_id: ContestId,
}

impl ContestGuard {
    pub fn new(source: Arc<dyn ContestSource>, contest_id: ContestId) -> Self {
        Self { source, contest_id }
    }

    pub fn contest_id(&self) -> &ContestId {
        &self.contest_id
    }

    pub async fn check(&self) -> GuardStatus {
        match self.source.current().await {
            Ok(pointer) if pointer.is_same_contest(&self.contest_id) => GuardStatus::Active,
            Ok(pointer) => {
                info!(
                    contest_id = %self.contest_id,
                    new_contest_id = %pointer.contest_id,
                    "contest switched, abandoning sequence"
                );
                GuardStatus::Switched
            }
            Err(e) => {
                warn!(
                    contest_id = %self.contest_id,
                    error = %e,
                    "contest pointer unreadable, pausing sequence"
                );
                GuardStatus::Unreadable
            }
        }
    }

    pub async fn still_active(&self) -> bool {
        self.check().await == GuardStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ContestPointer;
    use crate::error::GridcastError;
    use crate::traits::MockContestSource;

    fn pointer(id: &str) -> ContestPointer {
        ContestPointer {
            contest_id: ContestId::new(id),
            home_team: "WAS".to_string(),
            away_team: "SF".to_string(),
            game_time: None,
            pregame_stats_enabled: false,
        }
    }

    #[tokio::test]
    async fn test_same_contest_is_active() {
        let mut source = MockContestSource::new();
        source
            .expect_current()
            .times(1)
            .returning(|| Ok(pointer("20241201_SF@WAS")));

        let guard = ContestGuard::new(Arc::new(source), ContestId::new("20241201_SF@WAS"));
        assert!(guard.still_active().await);
    }

    #[test]
    fn test_guard_keeps_entry_contest() {
        let mut source = MockContestSource::new();
        source
            .expect_current()
            .returning(|| Ok(pointer("20241201_SF@WAS")));

        let guard = ContestGuard::new(Arc::new(source), ContestId::new(" 20241201_SF@WAS "));
        assert_eq!(guard.contest_id().as_str(), "20241201_SF@WAS");
        assert!(tokio_test::block_on(guard.still_active()));
    }

    #[tokio::test]
    async fn test_switch_or_unreadable_is_inactive() {
        let mut source = MockContestSource::new();
        let mut calls = 0;
        source.expect_current().times(2).returning(move || {
            calls += 1;
            if calls == 1 {
                Ok(pointer("20241208_DAL@NYG"))
            } else {
                Err(GridcastError::ContestUnavailable("file missing".to_string()))
            }
        });

        let guard = ContestGuard::new(Arc::new(source), ContestId::new("20241201_SF@WAS"));
        assert_eq!(guard.check().await, GuardStatus::Switched);
        assert_eq!(guard.check().await, GuardStatus::Unreadable);
    }
}
