use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Composite contest identifier, `YYYYMMDD_AWAY@HOME` or `YYYYMMDD_HOME_AWAY`.
///
/// Used verbatim as the correlation key with the feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContestId(String);

/// Team codes embedded in a contest id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matchup {
    pub home: String,
    pub away: String,
}

impl ContestId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `YYYYMMDD` prefix as written
    pub fn date_part(&self) -> &str {
        self.0.split('_').next().unwrap_or_default()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date_part(), "%Y%m%d").ok()
    }

    /// Date rendered as `DD.MM.YYYY`; falls back to the raw prefix
    pub fn display_date(&self) -> String {
        match self.date() {
            Some(date) => date.format("%d.%m.%Y").to_string(),
            None => self.date_part().to_string(),
        }
    }

    pub fn matchup(&self) -> Option<Matchup> {
        let (_, teams) = self.0.split_once('_')?;

        if let Some((away, home)) = teams.split_once('@') {
            return Self::matchup_from(home, away);
        }

        let (home, away) = teams.split_once('_')?;
        Self::matchup_from(home, away)
    }

    fn matchup_from(home: &str, away: &str) -> Option<Matchup> {
        let home = home.trim();
        let away = away.trim();
        if home.is_empty() || away.is_empty() {
            return None;
        }
        Some(Matchup {
            home: home.to_string(),
            away: away.to_string(),
        })
    }
}

impl fmt::Display for ContestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContestId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// The operator-selected contest, re-read before every emission decision.
#[derive(Debug, Clone)]
pub struct ContestPointer {
    pub contest_id: ContestId,
    pub home_team: String,
    pub away_team: String,
    /// Local kickoff time as entered by the operator (e.g. "1:00 PM")
    pub game_time: Option<String>,
    pub pregame_stats_enabled: bool,
}

impl ContestPointer {
    pub fn is_same_contest(&self, other: &ContestId) -> bool {
        &self.contest_id == other
    }
}

// Two pointers name the same contest regardless of display metadata.
impl PartialEq for ContestPointer {
    fn eq(&self, other: &Self) -> bool {
        self.contest_id == other.contest_id
    }
}

impl Eq for ContestPointer {}

#[cfg(test)]
mod tests {
    use super::*;

    fn pointer(id: &str, home: &str) -> ContestPointer {
        ContestPointer {
            contest_id: ContestId::new(id),
            home_team: home.to_string(),
            away_team: "SF".to_string(),
            game_time: Some("1:00 PM".to_string()),
            pregame_stats_enabled: true,
        }
    }

    #[test]
    fn test_away_at_home_format() {
        let id = ContestId::new("20241201_SF@WAS");
        assert_eq!(id.date(), NaiveDate::from_ymd_opt(2024, 12, 1));
        assert_eq!(id.display_date(), "01.12.2024");
        assert_eq!(
            id.matchup(),
            Some(Matchup {
                home: "WAS".to_string(),
                away: "SF".to_string()
            })
        );
    }

    #[test]
    fn test_home_underscore_away_format() {
        let id = ContestId::new("20241201_SF_WAS");
        let matchup = id.matchup().unwrap();
        assert_eq!(matchup.home, "SF");
        assert_eq!(matchup.away, "WAS");
    }

    #[test]
    fn test_malformed_id_degrades() {
        let id = ContestId::new("tonight");
        assert_eq!(id.date(), None);
        assert_eq!(id.display_date(), "tonight");
        assert_eq!(id.matchup(), None);
    }

    #[test]
    fn test_pointer_equality_ignores_metadata() {
        assert_eq!(pointer("20241201_SF@WAS", "WAS"), pointer("20241201_SF@WAS", "Washington"));
        assert_ne!(pointer("20241201_SF@WAS", "WAS"), pointer("20241208_DAL@WAS", "WAS"));
    }
}
