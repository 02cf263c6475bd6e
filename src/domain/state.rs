use std::fmt;

use super::contest::ContestId;
use super::snapshot::ScoringPlayRecord;

/// Contest phase as inferred from the feed.
///
/// Ordered: SCHEDULED < IN_PROGRESS < FINAL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GamePhase {
    /// Kickoff not reached yet
    Scheduled,
    /// Live, or the feed returned nothing usable
    InProgress,
    /// Completed; post-game content goes out once
    Final,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Scheduled => "SCHEDULED",
            GamePhase::InProgress => "IN_PROGRESS",
            GamePhase::Final => "FINAL",
        }
    }

    /// Phases only move forward
    pub fn can_transition_to(&self, target: GamePhase) -> bool {
        target >= *self
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of feeding a classified phase into the tracker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseChange {
    /// Same phase as the previous cycle
    Unchanged(GamePhase),
    /// Moved forward
    Entered { from: GamePhase, to: GamePhase },
    /// Feed reported an earlier phase; the held phase is kept
    Regressed { held: GamePhase, reported: GamePhase },
}

impl PhaseChange {
    /// Phase the tracker acts on this cycle
    pub fn effective(&self) -> GamePhase {
        match *self {
            PhaseChange::Unchanged(phase) => phase,
            PhaseChange::Entered { to, .. } => to,
            PhaseChange::Regressed { held, .. } => held,
        }
    }
}

/// Process-lifetime tracker state, owned by the poll loop.
#[derive(Debug, Clone)]
pub struct TrackerState {
    contest_id: Option<ContestId>,
    phase: GamePhase,
    last_seen_scoring_play: Option<ScoringPlayRecord>,
    /// Post-game sequence went out in full for this contest
    final_delivered: bool,
}

impl TrackerState {
    pub fn new() -> Self {
        Self {
            contest_id: None,
            phase: GamePhase::Scheduled,
            last_seen_scoring_play: None,
            final_delivered: false,
        }
    }

    pub fn contest_id(&self) -> Option<&ContestId> {
        self.contest_id.as_ref()
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn last_seen_scoring_play(&self) -> Option<&ScoringPlayRecord> {
        self.last_seen_scoring_play.as_ref()
    }

    /// Bind the state to `contest_id`, resetting everything if it differs
    /// from the contest observed so far. Returns true on reset.
    pub fn observe_contest(&mut self, contest_id: &ContestId) -> bool {
        if self.contest_id.as_ref() == Some(contest_id) {
            return false;
        }
        *self = Self {
            contest_id: Some(contest_id.clone()),
            ..Self::new()
        };
        true
    }

    /// Apply a classified phase, honoring forward moves only
    pub fn advance_phase(&mut self, reported: GamePhase) -> PhaseChange {
        let held = self.phase;

        if reported == held {
            return PhaseChange::Unchanged(held);
        }

        if !held.can_transition_to(reported) {
            return PhaseChange::Regressed { held, reported };
        }

        self.phase = reported;
        PhaseChange::Entered {
            from: held,
            to: reported,
        }
    }

    pub fn record_scoring_play(&mut self, latest: Option<ScoringPlayRecord>) {
        self.last_seen_scoring_play = latest;
    }

    /// FINAL content still owed for the current contest
    pub fn final_pending(&self) -> bool {
        self.phase == GamePhase::Final && !self.final_delivered
    }

    pub fn mark_final_delivered(&mut self) {
        self.final_delivered = true;
    }
}

impl Default for TrackerState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(desc: &str) -> ScoringPlayRecord {
        ScoringPlayRecord {
            description: Some(desc.to_string()),
            ..ScoringPlayRecord::default()
        }
    }

    #[test]
    fn test_valid_transitions() {
        use GamePhase::*;

        assert!(Scheduled.can_transition_to(InProgress));
        assert!(Scheduled.can_transition_to(Final));
        assert!(InProgress.can_transition_to(Final));

        assert!(!InProgress.can_transition_to(Scheduled));
        assert!(!Final.can_transition_to(InProgress));
        assert!(!Final.can_transition_to(Scheduled));
        assert_eq!(GamePhase::InProgress.to_string(), "IN_PROGRESS");
    }

    #[test]
    fn test_regression_is_ignored() {
        let mut state = TrackerState::new();
        state.observe_contest(&ContestId::new("20241201_SF@WAS"));

        assert_eq!(
            state.advance_phase(GamePhase::InProgress),
            PhaseChange::Entered {
                from: GamePhase::Scheduled,
                to: GamePhase::InProgress
            }
        );
        let change = state.advance_phase(GamePhase::Scheduled);
        assert_eq!(
            change,
            PhaseChange::Regressed {
                held: GamePhase::InProgress,
                reported: GamePhase::Scheduled
            }
        );
        assert_eq!(change.effective(), GamePhase::InProgress);
        assert_eq!(state.phase(), GamePhase::InProgress);
    }

    #[test]
    fn test_contest_switch_resets_state() {
        let mut state = TrackerState::new();
        let a = ContestId::new("20241201_SF@WAS");
        let b = ContestId::new("20241201_DAL@NYG");

        assert!(state.observe_contest(&a));
        state.advance_phase(GamePhase::Final);
        state.mark_final_delivered();
        state.record_scoring_play(Some(play("TD")));
        assert!(!state.observe_contest(&a));
        assert!(state.last_seen_scoring_play().is_some());

        assert!(state.observe_contest(&b));
        assert_eq!(state.contest_id(), Some(&b));
        assert_eq!(state.phase(), GamePhase::Scheduled);
        assert!(state.last_seen_scoring_play().is_none());
        assert!(!state.final_pending());
    }

    #[test]
    fn test_scoring_play_survives_phase_change() {
        let mut state = TrackerState::new();
        state.observe_contest(&ContestId::new("20241201_SF@WAS"));
        state.advance_phase(GamePhase::InProgress);
        state.record_scoring_play(Some(play("FG")));
        state.advance_phase(GamePhase::Final);
        assert_eq!(state.last_seen_scoring_play(), Some(&play("FG")));
    }

    #[test]
    fn test_final_pending_until_delivered() {
        let mut state = TrackerState::new();
        state.observe_contest(&ContestId::new("20241201_SF@WAS"));
        assert!(!state.final_pending());

        state.advance_phase(GamePhase::Final);
        assert!(state.final_pending());
        // A repeat FINAL report keeps it owed until delivery
        state.advance_phase(GamePhase::Final);
        assert!(state.final_pending());

        state.mark_final_delivered();
        assert!(!state.final_pending());
        assert_eq!(state.phase(), GamePhase::Final);
    }
}
