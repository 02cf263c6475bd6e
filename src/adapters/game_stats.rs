//! Pre/post-game statistics bundles built from Tank01 top performers.
//!
//! Each returned block becomes one output unit; the first line of a block
//! is its headline.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use super::tank01::{value_text, Tank01Client};
use crate::domain::ContestId;
use crate::error::{GridcastError, Result};
use crate::traits::BundleFormatter;

const MISSING: &str = "-";

/// Which side of the matchup a block describes
#[derive(Debug, Clone, Copy)]
enum Side {
    Home,
    Away,
}

/// Stat groups in emission order
#[derive(Debug, Clone, Copy)]
enum StatGroup {
    Passing,
    Rushing,
    Receiving,
    Defense,
}

impl StatGroup {
    const ALL: [StatGroup; 4] = [
        StatGroup::Passing,
        StatGroup::Rushing,
        StatGroup::Receiving,
        StatGroup::Defense,
    ];

    fn key(&self) -> &'static str {
        match self {
            StatGroup::Passing => "Passing",
            StatGroup::Rushing => "Rushing",
            StatGroup::Receiving => "Receiving",
            StatGroup::Defense => "Defense",
        }
    }
}

/// Scores-only game entry for one contest
#[derive(Debug, Clone)]
pub struct GameStats {
    contest_id: ContestId,
    home: String,
    away: String,
    game_time: Option<String>,
    game_status: Option<String>,
    top_performers: Value,
}

impl GameStats {
    /// Pick the contest's entry out of a scores-only body keyed by game id
    pub fn from_scores_body(contest_id: &ContestId, body: &Value) -> Result<Self> {
        let game = body.get(contest_id.as_str()).ok_or_else(|| {
            GridcastError::Formatter(format!("no game data for {}", contest_id))
        })?;

        let matchup = contest_id.matchup();
        let home = game
            .get("home")
            .and_then(value_text)
            .or_else(|| matchup.as_ref().map(|m| m.home.clone()))
            .unwrap_or_else(|| MISSING.to_string());
        let away = game
            .get("away")
            .and_then(value_text)
            .or_else(|| matchup.as_ref().map(|m| m.away.clone()))
            .unwrap_or_else(|| MISSING.to_string());

        Ok(Self {
            contest_id: contest_id.clone(),
            home,
            away,
            game_time: game.get("gameTime").and_then(value_text),
            game_status: game.get("gameStatus").and_then(value_text),
            top_performers: game.get("topPerformers").cloned().unwrap_or(Value::Null),
        })
    }

    fn team(&self, side: Side) -> &str {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    fn group(&self, side: Side, group: StatGroup) -> Option<&Value> {
        self.top_performers
            .get(self.team(side))
            .and_then(|team| team.get(group.key()))
            .filter(|v| v.is_object())
    }

    pub fn info_line(&self, timezone_label: &str) -> String {
        format!(
            "{} vs {} | {} {} {} | {}",
            self.home,
            self.away,
            self.contest_id.display_date(),
            self.game_time.as_deref().unwrap_or("TBD"),
            timezone_label,
            self.game_status.as_deref().unwrap_or(MISSING)
        )
    }

    /// `{TEAM} | Pass: X YDs, Y TD | INT: Z` for one side
    fn passing_summary_line(&self, side: Side) -> String {
        let team = self.team(side);
        match self.group(side, StatGroup::Passing) {
            Some(p) => format!(
                "{} | Pass: {} YDs, {} TD | INT: {}",
                team,
                total(p, "passYds"),
                total(p, "passTD"),
                total(p, "int")
            ),
            None => unavailable(team),
        }
    }

    pub fn team_summary_block(&self) -> String {
        format!(
            "{}\n{}",
            self.passing_summary_line(Side::Home),
            self.passing_summary_line(Side::Away)
        )
    }

    fn group_block(&self, side: Side, group: StatGroup) -> String {
        let team = self.team(side);
        let Some(s) = self.group(side, group) else {
            return unavailable(team);
        };

        match group {
            StatGroup::Passing => format!(
                "{} Passing Statistics\nYards: {} | TD: {} | Comp: {}/{}",
                team,
                total(s, "passYds"),
                total(s, "passTD"),
                total(s, "passCompletions"),
                total(s, "passAttempts")
            ),
            StatGroup::Rushing => format!(
                "{} Rushing Statistics\nYards: {} | TD: {} | Carries: {}",
                team,
                total(s, "rushYds"),
                total(s, "rushTD"),
                total(s, "carries")
            ),
            StatGroup::Receiving => format!(
                "{} Receiving Statistics\nReceptions: {} | Yards: {} | TD: {}",
                team,
                total(s, "receptions"),
                total(s, "recYds"),
                total(s, "recTD")
            ),
            StatGroup::Defense => format!(
                "{} Defense Statistics\nTackles: {} | Sacks: {} | INT: {}",
                team,
                total(s, "totalTackles"),
                total(s, "sacks"),
                total(s, "defensiveInterceptions")
            ),
        }
    }

    /// Home then away, each passing → rushing → receiving → defense
    pub fn statistics_blocks(&self) -> Vec<String> {
        [Side::Home, Side::Away]
            .into_iter()
            .flat_map(|side| {
                StatGroup::ALL
                    .into_iter()
                    .map(move |group| self.group_block(side, group))
            })
            .collect()
    }

    pub fn pregame_blocks(&self, timezone_label: &str) -> Vec<String> {
        let mut blocks = vec![self.info_line(timezone_label), self.team_summary_block()];
        blocks.extend(self.statistics_blocks());
        blocks
    }

    pub fn postgame_blocks(&self) -> Vec<String> {
        let mut blocks = vec![
            format!("{} vs {} | Final Statistics", self.home, self.away),
            self.team_summary_block(),
        ];
        blocks.extend(self.statistics_blocks());
        blocks
    }
}

fn total(group: &Value, stat: &str) -> String {
    group
        .get(stat)
        .and_then(|s| s.get("total"))
        .and_then(value_text)
        .unwrap_or_else(|| MISSING.to_string())
}

fn unavailable(team: &str) -> String {
    format!("{} - Stats unavailable", team)
}

/// `BundleFormatter` backed by the Tank01 scores-only endpoint
pub struct TopPerformersFormatter {
    client: Tank01Client,
    timezone_label: String,
}

impl TopPerformersFormatter {
    pub fn new(client: Tank01Client, timezone_label: impl Into<String>) -> Self {
        Self {
            client,
            timezone_label: timezone_label.into(),
        }
    }

    async fn load(&self, contest_id: &ContestId) -> Result<GameStats> {
        let body = self
            .client
            .fetch_scores_with_top_performers(contest_id.date_part())
            .await
            .map_err(|e| {
                warn!(contest_id = %contest_id, error = %e, "top performers fetch failed");
                GridcastError::Formatter(e.to_string())
            })?;
        GameStats::from_scores_body(contest_id, &body)
    }
}

#[async_trait]
impl BundleFormatter for TopPerformersFormatter {
    async fn pregame_bundle(&self, contest_id: &ContestId) -> Result<Vec<String>> {
        let stats = self.load(contest_id).await?;
        let blocks = stats.pregame_blocks(&self.timezone_label);
        debug!(contest_id = %contest_id, blocks = blocks.len(), "pre-game bundle built");
        Ok(blocks)
    }

    async fn postgame_bundle(&self, contest_id: &ContestId) -> Result<Vec<String>> {
        let stats = self.load(contest_id).await?;
        let blocks = stats.postgame_blocks();
        debug!(contest_id = %contest_id, blocks = blocks.len(), "post-game bundle built");
        Ok(blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ID: &str = "20241201_SF@WAS";

    fn scores_body() -> Value {
        json!({
            ID: {
                "gameID": ID,
                "home": "WAS",
                "away": "SF",
                "gameTime": "1:00p",
                "gameStatus": "Scheduled",
                "topPerformers": {
                    "WAS": {
                        "Passing": {
                            "passYds": {"total": "245", "playerID": ["1"]},
                            "passTD": {"total": "2"},
                            "int": {"total": "1"},
                            "passCompletions": {"total": "22"},
                            "passAttempts": {"total": "31"}
                        },
                        "Rushing": {
                            "rushYds": {"total": 88},
                            "rushTD": {"total": 1},
                            "carries": {"total": 19}
                        },
                        "Receiving": {
                            "receptions": {"total": "7"},
                            "recYds": {"total": "104"},
                            "recTD": {"total": "1"}
                        },
                        "Defense": {
                            "totalTackles": {"total": "9"},
                            "sacks": {"total": "1.5"}
                        }
                    },
                    "SF": {
                        "Passing": {
                            "passYds": {"total": "301"},
                            "passTD": {"total": "3"},
                            "int": {"total": "0"},
                            "passCompletions": {"total": "25"},
                            "passAttempts": {"total": "35"}
                        }
                    }
                }
            }
        })
    }

    fn stats() -> GameStats {
        GameStats::from_scores_body(&ContestId::new(ID), &scores_body()).unwrap()
    }

    #[test]
    fn test_pregame_blocks_layout() {
        let blocks = stats().pregame_blocks("EST");
        assert_eq!(blocks.len(), 10);
        assert_eq!(blocks[0], "WAS vs SF | 01.12.2024 1:00p EST | Scheduled");
        assert_eq!(
            blocks[1],
            "WAS | Pass: 245 YDs, 2 TD | INT: 1\nSF | Pass: 301 YDs, 3 TD | INT: 0"
        );
        assert_eq!(
            blocks[2],
            "WAS Passing Statistics\nYards: 245 | TD: 2 | Comp: 22/31"
        );
        assert_eq!(
            blocks[3],
            "WAS Rushing Statistics\nYards: 88 | TD: 1 | Carries: 19"
        );
        assert_eq!(
            blocks[4],
            "WAS Receiving Statistics\nReceptions: 7 | Yards: 104 | TD: 1"
        );
        // Missing individual stat renders as a dash
        assert_eq!(
            blocks[5],
            "WAS Defense Statistics\nTackles: 9 | Sacks: 1.5 | INT: -"
        );
        assert_eq!(
            blocks[6],
            "SF Passing Statistics\nYards: 301 | TD: 3 | Comp: 25/35"
        );
        assert_eq!(blocks[7], "SF - Stats unavailable");
        assert_eq!(blocks[9], "SF - Stats unavailable");
    }

    #[test]
    fn test_postgame_blocks_drop_info_line() {
        let blocks = stats().postgame_blocks();
        assert_eq!(blocks[0], "WAS vs SF | Final Statistics");
        assert!(blocks.iter().all(|b| !b.contains("Scheduled")));
        assert_eq!(blocks.len(), 10);
    }

    #[test]
    fn test_missing_game_is_formatter_error() {
        let err = GameStats::from_scores_body(&ContestId::new("20241201_DAL@NYG"), &scores_body())
            .unwrap_err();
        assert!(matches!(err, GridcastError::Formatter(_)));
    }

    #[test]
    fn test_no_top_performers_at_all() {
        let body = json!({ ID: {"home": "WAS", "away": "SF"} });
        let stats = GameStats::from_scores_body(&ContestId::new(ID), &body).unwrap();
        assert_eq!(
            stats.team_summary_block(),
            "WAS - Stats unavailable\nSF - Stats unavailable"
        );
        assert!(stats
            .statistics_blocks()
            .iter()
            .all(|b| b.ends_with("Stats unavailable")));
    }

    #[tokio::test]
    async fn test_formatter_fetches_by_contest_date() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/getNFLScoresOnly"))
            .and(query_param("gameDate", "20241201"))
            .and(query_param("topPerformers", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "statusCode": 200,
                "body": scores_body()
            })))
            .expect(2)
            .mount(&server)
            .await;

        let client =
            Tank01Client::new(&server.uri(), "tank01.example", None, Duration::from_secs(5))
                .unwrap();
        let formatter = TopPerformersFormatter::new(client, "ET");
        let id = ContestId::new(ID);

        let pre = formatter.pregame_bundle(&id).await.unwrap();
        assert!(pre[0].contains("1:00p ET"));
        let post = formatter.postgame_bundle(&id).await.unwrap();
        assert_eq!(post[0], "WAS vs SF | Final Statistics");
    }

    #[tokio::test]
    async fn test_formatter_surfaces_feed_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client =
            Tank01Client::new(&server.uri(), "tank01.example", None, Duration::from_secs(5))
                .unwrap();
        let formatter = TopPerformersFormatter::new(client, "EST");
        let err = formatter
            .pregame_bundle(&ContestId::new(ID))
            .await
            .unwrap_err();
        assert!(matches!(err, GridcastError::Formatter(_)));
    }
}
