//! Feed snapshot types.
//!
//! Every field read by the classifier or differ is optional: a missing
//! value stays `None` instead of being defaulted to `"0"` or `""`.

use super::contest::ContestId;

/// One scoring event as reported by the feed.
///
/// The feed carries no stable event id, so records are compared by value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoringPlayRecord {
    pub period: Option<String>,
    pub clock_time: Option<String>,
    pub team: Option<String>,
    pub score_type: Option<String>,
    pub score_value: Option<String>,
    pub running_home_score: Option<String>,
    pub running_away_score: Option<String>,
    pub description: Option<String>,
}

/// Most recent play-by-play entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LatestPlay {
    pub clock: Option<String>,
    pub period: Option<String>,
    pub down_and_distance: Option<String>,
    pub description: Option<String>,
}

/// Points per period for one side
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineScore {
    pub q1: Option<String>,
    pub q2: Option<String>,
    pub q3: Option<String>,
    pub q4: Option<String>,
    pub ot: Option<String>,
}

impl LineScore {
    /// Regulation quarters in order
    pub fn regulation(&self) -> [Option<&str>; 4] {
        [
            self.q1.as_deref(),
            self.q2.as_deref(),
            self.q3.as_deref(),
            self.q4.as_deref(),
        ]
    }

    pub fn overtime(&self) -> Option<&str> {
        self.ot.as_deref().filter(|ot| !ot.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuarterScores {
    pub home: LineScore,
    pub away: LineScore,
}

/// One fetched, immutable view of a contest's live box score.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameSnapshot {
    pub game_id: Option<String>,
    pub raw_status_text: Option<String>,
    pub error_text: Option<String>,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub home_score: Option<String>,
    pub away_score: Option<String>,
    pub quarter_scores: Option<QuarterScores>,
    pub latest_play: Option<LatestPlay>,
    /// Most-recent-first
    pub scoring_plays: Option<Vec<ScoringPlayRecord>>,
}

impl GameSnapshot {
    /// Degenerate snapshot carrying only provider error text
    pub fn provider_error(contest_id: &ContestId, message: impl Into<String>) -> Self {
        Self {
            game_id: Some(contest_id.to_string()),
            error_text: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn newest_scoring_play(&self) -> Option<&ScoringPlayRecord> {
        self.scoring_plays.as_ref().and_then(|plays| plays.first())
    }

    /// Scoring plays in feed order; empty when absent
    pub fn scoring_plays(&self) -> &[ScoringPlayRecord] {
        self.scoring_plays.as_deref().unwrap_or_default()
    }

    /// True when the snapshot carries no box-score data at all
    pub fn is_degenerate(&self) -> bool {
        self.raw_status_text.is_none()
            && self.home_score.is_none()
            && self.away_score.is_none()
            && self.latest_play.is_none()
            && self.scoring_plays.is_none()
    }
}
