//! Operator-maintained JSON file naming the contest to track.
//!
//! ```json
//! {"contestid": "20241201_SF@WAS", "hometeam": "WAS", "awayteam": "SF",
//!  "gametime": "1:00 PM", "pregamestats": 1}
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::domain::{ContestId, ContestPointer};
use crate::error::{GridcastError, Result};
use crate::traits::ContestSource;

#[derive(Debug, Deserialize)]
struct ContestRecord {
    contestid: String,
    #[serde(default)]
    hometeam: Option<String>,
    #[serde(default)]
    awayteam: Option<String>,
    #[serde(default)]
    gametime: Option<String>,
    #[serde(default = "default_pregame_stats", deserialize_with = "flag")]
    pregamestats: bool,
}

fn default_pregame_stats() -> bool {
    true
}

/// `true`/`1`/`"1"`/`"true"` are on; anything else is off
fn flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("true")
                || s.eq_ignore_ascii_case("yes")
                || s.parse::<f64>().map(|f| f != 0.0).unwrap_or(false)
        }
        Value::Null => true,
        _ => false,
    })
}

/// `ContestSource` reading a JSON pointer file on every call
pub struct ContestFile {
    path: PathBuf,
}

impl ContestFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(&self, raw: &str) -> Result<ContestPointer> {
        let record: ContestRecord = serde_json::from_str(raw).map_err(|e| {
            GridcastError::ContestUnavailable(format!("{}: {}", self.path.display(), e))
        })?;

        let contest_id = ContestId::new(record.contestid);
        if contest_id.as_str().is_empty() {
            return Err(GridcastError::ContestUnavailable(format!(
                "{}: empty contestid",
                self.path.display()
            )));
        }

        // Fall back to the codes embedded in the id
        let matchup = contest_id.matchup();
        let home_team = non_empty(record.hometeam)
            .or_else(|| matchup.as_ref().map(|m| m.home.clone()))
            .unwrap_or_default();
        let away_team = non_empty(record.awayteam)
            .or_else(|| matchup.as_ref().map(|m| m.away.clone()))
            .unwrap_or_default();

        Ok(ContestPointer {
            contest_id,
            home_team,
            away_team,
            game_time: non_empty(record.gametime),
            pregame_stats_enabled: record.pregamestats,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[async_trait]
impl ContestSource for ContestFile {
    async fn current(&self) -> Result<ContestPointer> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            GridcastError::ContestUnavailable(format!("{}: {}", self.path.display(), e))
        })?;
        self.parse(&raw)
    }
}
