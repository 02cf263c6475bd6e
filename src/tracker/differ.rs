use crate::domain::{GameSnapshot, ScoringPlayRecord, TrackerState};

/// Outcome of comparing a snapshot's newest scoring play with the last one seen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringDiff {
    /// A new scoring event worth a summary bundle
    pub changed: bool,
    /// Candidate `last_seen_scoring_play` for the state
    pub latest: Option<ScoringPlayRecord>,
}

/// Detects new scoring events by full value equality on the newest record.
///
/// The feed re-sends the whole list every poll and has no event ids, so
/// ordering says nothing; only a differing newest record counts. The first
/// record seen in a contest is backfill, not news.
pub struct ScoringPlayDiffer;

impl ScoringPlayDiffer {
    pub fn diff(snapshot: &GameSnapshot, state: &TrackerState) -> ScoringDiff {
        Self::diff_against(snapshot, state.last_seen_scoring_play())
    }

    pub fn diff_against(
        snapshot: &GameSnapshot,
        last_seen: Option<&ScoringPlayRecord>,
    ) -> ScoringDiff {
        let Some(newest) = snapshot.newest_scoring_play() else {
            // No list this cycle: keep what was seen, never regress to None
            return ScoringDiff {
                changed: false,
                latest: last_seen.cloned(),
            };
        };

        let changed = match last_seen {
            None => false,
            Some(previous) => previous != newest,
        };

        ScoringDiff {
            changed,
            latest: Some(newest.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ContestId;

    fn record(home: &str, away: &str, desc: &str) -> ScoringPlayRecord {
        ScoringPlayRecord {
            period: Some("Q2".to_string()),
            clock_time: Some("07:12".to_string()),
            team: Some("SF".to_string()),
            score_type: Some("TD".to_string()),
            score_value: Some("Touchdown".to_string()),
            running_home_score: Some(home.to_string()),
            running_away_score: Some(away.to_string()),
            description: Some(desc.to_string()),
        }
    }

    fn snapshot(plays: Vec<ScoringPlayRecord>) -> GameSnapshot {
        GameSnapshot {
            scoring_plays: Some(plays),
            ..GameSnapshot::default()
        }
    }

    fn state_with(last: Option<ScoringPlayRecord>) -> TrackerState {
        let mut state = TrackerState::new();
        state.observe_contest(&ContestId::new("20241201_SF@WAS"));
        state.record_scoring_play(last);
        state
    }

    #[test]
    fn test_first_contact_is_backfill() {
        let snap = snapshot(vec![record("7", "0", "pass"), record("0", "0", "older")]);
        let diff = ScoringPlayDiffer::diff(&snap, &state_with(None));
        assert!(!diff.changed);
        assert_eq!(diff.latest, Some(record("7", "0", "pass")));
    }

    #[test]
    fn test_same_snapshot_twice_is_idempotent() {
        let snap = snapshot(vec![record("7", "0", "pass")]);
        let mut state = state_with(None);

        let first = ScoringPlayDiffer::diff(&snap, &state);
        state.record_scoring_play(first.latest);
        let second = ScoringPlayDiffer::diff(&snap, &state);
        assert!(!second.changed);
        assert_eq!(second.latest, Some(record("7", "0", "pass")));
    }

    #[test]
    fn test_new_newest_record_is_change() {
        let state = state_with(Some(record("7", "0", "pass")));
        let snap = snapshot(vec![record("7", "3", "field goal"), record("7", "0", "pass")]);
        let diff = ScoringPlayDiffer::diff(&snap, &state);
        assert!(diff.changed);
        assert_eq!(diff.latest, Some(record("7", "3", "field goal")));
    }

    #[test]
    fn test_corrected_record_counts_as_change() {
        // Feed edits the description of the same play: value equality says new
        let state = state_with(Some(record("7", "0", "pass")));
        let snap = snapshot(vec![record("7", "0", "pass (kick good)")]);
        assert!(ScoringPlayDiffer::diff(&snap, &state).changed);
    }

    #[test]
    fn test_missing_list_keeps_last_seen() {
        let state = state_with(Some(record("7", "0", "pass")));
        for snap in [GameSnapshot::default(), snapshot(vec![])] {
            let diff = ScoringPlayDiffer::diff(&snap, &state);
            assert!(!diff.changed);
            assert_eq!(diff.latest, Some(record("7", "0", "pass")));
        }
    }
}
