//! Tank01 NFL live feed adapter (RapidAPI).
//!
//! Every response is wrapped in `{statusCode, body}`. A non-200 `statusCode`
//! inside an otherwise valid response is a provider signal, not a transport
//! failure: `FeedClient::fetch` turns it into a degenerate snapshot so the
//! "not started" text still reaches the classifier.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::FeedConfig;
use crate::domain::{
    ContestId, GameSnapshot, LatestPlay, LineScore, QuarterScores, ScoringPlayRecord,
};
use crate::error::{FeedError, GridcastError, Result};
use crate::traits::FeedClient;

const BOX_SCORE_ENDPOINT: &str = "getNFLBoxScore";
const SCORES_ONLY_ENDPOINT: &str = "getNFLScoresOnly";

/// Accept strings, numbers and null for text fields
pub(crate) fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| value_text(&v)))
}

pub(crate) fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ── Wire types ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "statusCode", default)]
    status_code: Option<i64>,
    #[serde(default)]
    body: Option<Value>,
    #[serde(default, deserialize_with = "lenient_text")]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireBoxScore {
    #[serde(rename = "gameID", default, deserialize_with = "lenient_text")]
    game_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    game_status: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    error: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    home: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    away: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    home_pts: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    away_pts: Option<String>,
    #[serde(default)]
    line_score: Option<WireLineScores>,
    #[serde(default)]
    scoring_plays: Option<Vec<WireScoringPlay>>,
    #[serde(default)]
    all_play_by_play: Option<Vec<WirePlay>>,
}

#[derive(Debug, Deserialize)]
struct WireLineScores {
    #[serde(default)]
    home: Option<WireLineScore>,
    #[serde(default)]
    away: Option<WireLineScore>,
}

#[derive(Debug, Deserialize)]
struct WireLineScore {
    #[serde(default, alias = "Q1", deserialize_with = "lenient_text")]
    q1: Option<String>,
    #[serde(default, alias = "Q2", deserialize_with = "lenient_text")]
    q2: Option<String>,
    #[serde(default, alias = "Q3", deserialize_with = "lenient_text")]
    q3: Option<String>,
    #[serde(default, alias = "Q4", deserialize_with = "lenient_text")]
    q4: Option<String>,
    #[serde(default, alias = "OT", deserialize_with = "lenient_text")]
    ot: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireScoringPlay {
    #[serde(default, deserialize_with = "lenient_text")]
    score_period: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    score_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    team: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    score_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    score: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    home_score: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    away_score: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    score_details: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePlay {
    #[serde(default, deserialize_with = "lenient_text")]
    play_clock: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    play_period: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    down_and_distance: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    play: Option<String>,
}

impl From<WireLineScore> for LineScore {
    fn from(w: WireLineScore) -> Self {
        Self {
            q1: w.q1,
            q2: w.q2,
            q3: w.q3,
            q4: w.q4,
            ot: w.ot,
        }
    }
}

impl From<WireScoringPlay> for ScoringPlayRecord {
    fn from(w: WireScoringPlay) -> Self {
        Self {
            period: w.score_period,
            clock_time: w.score_time,
            team: w.team,
            score_type: w.score_type,
            score_value: w.score,
            running_home_score: w.home_score,
            running_away_score: w.away_score,
            description: w.score_details,
        }
    }
}

impl From<WirePlay> for LatestPlay {
    fn from(w: WirePlay) -> Self {
        Self {
            clock: w.play_clock,
            period: w.play_period,
            down_and_distance: w.down_and_distance,
            description: w.play,
        }
    }
}

impl From<WireBoxScore> for GameSnapshot {
    fn from(w: WireBoxScore) -> Self {
        let quarter_scores = w.line_score.map(|ls| QuarterScores {
            home: ls.home.map(LineScore::from).unwrap_or_default(),
            away: ls.away.map(LineScore::from).unwrap_or_default(),
        });

        // Feed lists the newest play first
        let latest_play = w
            .all_play_by_play
            .and_then(|plays| plays.into_iter().next())
            .map(LatestPlay::from);

        Self {
            game_id: w.game_id,
            raw_status_text: w.game_status,
            error_text: w.error,
            home_team: w.home,
            away_team: w.away,
            home_score: w.home_pts,
            away_score: w.away_pts,
            quarter_scores,
            latest_play,
            scoring_plays: w
                .scoring_plays
                .map(|plays| plays.into_iter().map(ScoringPlayRecord::from).collect()),
        }
    }
}

// ── Client ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct Tank01Client {
    http: Client,
    base_url: String,
    api_host: String,
    api_key: Option<String>,
}

impl Tank01Client {
    pub fn new(
        base_url: &str,
        api_host: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .user_agent("gridcast/0.1")
            .timeout(timeout)
            .build()
            .map_err(|e| GridcastError::Internal(format!("failed to build feed HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_host: api_host.to_string(),
            api_key,
        })
    }

    pub fn from_config(cfg: &FeedConfig) -> Result<Self> {
        Self::new(
            &cfg.base_url,
            &cfg.api_host,
            cfg.resolved_api_key(),
            Duration::from_secs(cfg.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers(&self) -> std::result::Result<HeaderMap, FeedError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-rapidapi-host"),
            HeaderValue::from_str(&self.api_host)
                .map_err(|e| FeedError::Network(format!("invalid api host header: {}", e)))?,
        );
        if let Some(key) = &self.api_key {
            headers.insert(
                HeaderName::from_static("x-rapidapi-key"),
                HeaderValue::from_str(key)
                    .map_err(|e| FeedError::Network(format!("invalid api key header: {}", e)))?,
            );
        }
        Ok(headers)
    }

    /// GET an endpoint and return the envelope body of a 200 response
    pub async fn get_body(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> std::result::Result<Value, FeedError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let resp = self
            .http
            .get(&url)
            .headers(self.headers()?)
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(FeedError::Network(format!(
                "{} returned HTTP {}: {}",
                endpoint,
                status,
                truncate(&text, 200)
            )));
        }

        let envelope: Envelope = serde_json::from_str(&text)?;
        match envelope.status_code {
            Some(200) | None => envelope
                .body
                .ok_or_else(|| FeedError::Parse(format!("{} response has no body", endpoint))),
            Some(code) => {
                let message = envelope
                    .error
                    .or_else(|| envelope.body.as_ref().and_then(body_message))
                    .unwrap_or_else(|| format!("{} returned status {}", endpoint, code));
                Err(FeedError::Provider {
                    status_code: code,
                    message,
                })
            }
        }
    }

    /// Box score with play-by-play for one contest
    pub async fn fetch_box_score(
        &self,
        contest_id: &ContestId,
    ) -> std::result::Result<GameSnapshot, FeedError> {
        let body = self
            .get_body(
                BOX_SCORE_ENDPOINT,
                &[("gameID", contest_id.as_str()), ("playByPlay", "true")],
            )
            .await?;

        match body {
            Value::Object(_) => {
                let wire: WireBoxScore = serde_json::from_value(body)?;
                Ok(GameSnapshot::from(wire))
            }
            // Some errors arrive as a bare string body
            Value::String(message) => Ok(GameSnapshot::provider_error(contest_id, message)),
            other => Err(FeedError::Parse(format!(
                "unexpected box score body: {}",
                truncate(&other.to_string(), 200)
            ))),
        }
    }

    /// Scores-only listing for one date, including top performers
    pub async fn fetch_scores_with_top_performers(
        &self,
        game_date: &str,
    ) -> std::result::Result<Value, FeedError> {
        self.get_body(
            SCORES_ONLY_ENDPOINT,
            &[("gameDate", game_date), ("topPerformers", "true")],
        )
        .await
    }
}

#[async_trait]
impl FeedClient for Tank01Client {
    async fn fetch(&self, contest_id: &ContestId) -> std::result::Result<GameSnapshot, FeedError> {
        match self.fetch_box_score(contest_id).await {
            Err(FeedError::Provider {
                status_code,
                message,
            }) => {
                debug!(contest_id = %contest_id, status_code, message = %message, "provider error surfaced as snapshot");
                Ok(GameSnapshot::provider_error(contest_id, message))
            }
            other => other,
        }
    }
}

fn body_message(body: &Value) -> Option<String> {
    match body {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("error").and_then(value_text),
        _ => None,
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
