//! Text layout of every unit the tracker emits.
//!
//! Missing feed values render as `-`.

use crate::domain::{
    ContestPointer, GameSnapshot, LatestPlay, LineScore, OutputUnit, ScoringPlayRecord,
};
use crate::error::Result;

const MISSING: &str = "-";

/// Team labels for a contest: feed codes when present, operator labels otherwise
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Teams {
    pub home: String,
    pub away: String,
}

impl Teams {
    /// Feed codes win over the pointer's; both are flattened to one line
    pub fn resolve(snapshot: &GameSnapshot, pointer: &ContestPointer) -> Self {
        Self {
            home: team_label(snapshot.home_team.as_deref(), &pointer.home_team),
            away: team_label(snapshot.away_team.as_deref(), &pointer.away_team),
        }
    }
}

fn team_label<'a>(feed: Option<&'a str>, fallback: &'a str) -> String {
    let feed = feed.filter(|t| !t.trim().is_empty());
    clean(Some(feed.unwrap_or(fallback)))
}

/// Feed text flattened to a single line
fn clean(value: Option<&str>) -> String {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => v.split_whitespace().collect::<Vec<_>>().join(" "),
        None => MISSING.to_string(),
    }
}

fn unit(first: String, second: Option<String>) -> Result<OutputUnit> {
    let mut lines = vec![first];
    lines.extend(second);
    OutputUnit::new(lines)
}

/// `HOME vs AWAY | DD.MM.YYYY TIME TZ | Not Started Yet`
pub fn not_started_unit(pointer: &ContestPointer, timezone_label: &str) -> Result<OutputUnit> {
    let game_time = pointer
        .game_time
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("TBD");

    unit(
        format!(
            "{} vs {} | {} {} {} | Not Started Yet",
            clean(Some(&pointer.home_team)),
            clean(Some(&pointer.away_team)),
            pointer.contest_id.display_date(),
            game_time,
            timezone_label
        ),
        None,
    )
}

/// `HOME 14 vs AWAY 10`
pub fn score_line(teams: &Teams, snapshot: &GameSnapshot) -> String {
    format!(
        "{} {} vs {} {}",
        teams.home,
        clean(snapshot.home_score.as_deref()),
        teams.away,
        clean(snapshot.away_score.as_deref())
    )
}

/// Live play: score line with down & distance, then clock, period and play text
pub fn live_play_unit(teams: &Teams, snapshot: &GameSnapshot, play: &LatestPlay) -> Result<OutputUnit> {
    let down = play
        .down_and_distance
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());

    let headline = match down {
        Some(d) => format!("{} {}", score_line(teams, snapshot), d),
        None => score_line(teams, snapshot),
    };

    let detail = match down {
        Some(d) => format!(
            "{}-{} | {} {}",
            clean(play.clock.as_deref()),
            clean(play.period.as_deref()),
            d,
            clean(play.description.as_deref())
        ),
        None => format!(
            "{}-{} | {}",
            clean(play.clock.as_deref()),
            clean(play.period.as_deref()),
            clean(play.description.as_deref())
        ),
    };

    unit(headline, Some(detail))
}

pub fn scoring_summary_unit(play: &ScoringPlayRecord) -> Result<OutputUnit> {
    unit(
        "SCORING SUMMARY".to_string(),
        Some(format!(
            "{}-{}",
            clean(play.score_type.as_deref()),
            clean(play.score_value.as_deref())
        )),
    )
}

pub fn drive_summary_unit(play: &ScoringPlayRecord) -> Result<OutputUnit> {
    unit(
        "DRIVE SCORING SUMMARY".to_string(),
        Some(format!(
            "{} ({}-{} | {} {})",
            clean(play.team.as_deref()),
            clean(play.period.as_deref()),
            clean(play.clock_time.as_deref()),
            clean(play.score_type.as_deref()),
            clean(play.description.as_deref())
        )),
    )
}

fn quarter_detail(label: &str, team: &str, line: Option<&LineScore>, total: Option<&str>) -> String {
    let mut columns: Vec<String> = match line {
        Some(line) => line.regulation().iter().map(|q| clean(*q)).collect(),
        None => vec![MISSING.to_string(); 4],
    };
    if let Some(ot) = line.and_then(LineScore::overtime) {
        columns.push(clean(Some(ot)));
    }
    columns.push(clean(total));

    format!("{} {} {}", label, team, columns.join(" | "))
}

/// Final score line paired with the home and away quarter breakdowns
pub fn final_units(teams: &Teams, snapshot: &GameSnapshot) -> Result<(OutputUnit, OutputUnit)> {
    let main = format!("{} | Final", score_line(teams, snapshot));
    let quarters = snapshot.quarter_scores.as_ref();

    let home = quarter_detail(
        "hometeam",
        &teams.home,
        quarters.map(|q| &q.home),
        snapshot.home_score.as_deref(),
    );
    let away = quarter_detail(
        "awayteam",
        &teams.away,
        quarters.map(|q| &q.away),
        snapshot.away_score.as_deref(),
    );

    Ok((unit(main.clone(), Some(home))?, unit(main, Some(away))?))
}

/// One recap unit per scoring play, in feed order
pub fn postgame_scoring_units(teams: &Teams, snapshot: &GameSnapshot) -> Result<Vec<OutputUnit>> {
    snapshot
        .scoring_plays()
        .iter()
        .map(|play| {
            unit(
                format!(
                    "{} {} vs {} {} | {} - {} | {}",
                    teams.home,
                    clean(play.running_home_score.as_deref()),
                    teams.away,
                    clean(play.running_away_score.as_deref()),
                    clean(play.clock_time.as_deref()),
                    clean(play.period.as_deref()),
                    clean(play.description.as_deref())
                ),
                Some(format!(
                    "{} - {}",
                    clean(play.score_type.as_deref()),
                    clean(play.score_value.as_deref())
                )),
            )
        })
        .collect()
}

/// Placeholder emitted when no snapshot could be fetched
pub fn fetch_failure_unit(pointer: &ContestPointer) -> Result<OutputUnit> {
    unit(
        format!(
            "| Match {} vs {} API SYSTEM ERROR |",
            clean(Some(&pointer.home_team)),
            clean(Some(&pointer.away_team))
        ),
        Some("| API ERROR |".to_string()),
    )
}
