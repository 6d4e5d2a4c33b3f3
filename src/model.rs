use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::teams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "PG")]
    PointGuard,
    #[serde(rename = "SG")]
    ShootingGuard,
    #[serde(rename = "SF")]
    SmallForward,
    #[serde(rename = "PF")]
    PowerForward,
    #[serde(rename = "C")]
    Center,
}

impl Position {
    pub const ALL: [Position; 5] = [
        Position::PointGuard,
        Position::ShootingGuard,
        Position::SmallForward,
        Position::PowerForward,
        Position::Center,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Position::PointGuard => "PG",
            Position::ShootingGuard => "SG",
            Position::SmallForward => "SF",
            Position::PowerForward => "PF",
            Position::Center => "C",
        }
    }

    pub fn from_code(raw: &str) -> Option<Self> {
        let code = raw.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|p| p.code() == code)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineupEntry {
    pub position: Position,
    pub player: String,
    pub team: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub time: String,
    pub home_team: String,
    pub away_team: String,
    pub home_lineup: Vec<LineupEntry>,
    pub away_lineup: Vec<LineupEntry>,
}

impl Game {
    pub fn summary(&self) -> GameSummary {
        GameSummary {
            time: self.time.clone(),
            away_team: self.away_team.clone(),
            home_team: self.home_team.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawGame {
    #[serde(default)]
    pub time: String,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub home_lineup: Vec<RawLineupEntry>,
    #[serde(default)]
    pub away_lineup: Vec<RawLineupEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLineupEntry {
    pub position: String,
    pub player: String,
    #[serde(default)]
    pub team: Option<String>,
}

impl RawGame {
    /// `None` when both sides resolve to the same team.
    pub fn into_game(self) -> Option<Game> {
        let home_team = strip_record_suffix(&self.home_team);
        let away_team = strip_record_suffix(&self.away_team);
        if home_team.is_empty() || away_team.is_empty() || teams::same_team(&home_team, &away_team) {
            return None;
        }
        let home_lineup = clean_lineup(self.home_lineup, &home_team);
        let away_lineup = clean_lineup(self.away_lineup, &away_team);
        Some(Game {
            time: self.time.trim().to_string(),
            home_team,
            away_team,
            home_lineup,
            away_lineup,
        })
    }
}

fn clean_lineup(entries: Vec<RawLineupEntry>, side_team: &str) -> Vec<LineupEntry> {
    entries
        .into_iter()
        .filter_map(|entry| {
            let Some(position) = Position::from_code(&entry.position) else {
                tracing::debug!(player = %entry.player, code = %entry.position, "dropping lineup entry with unknown position");
                return None;
            };
            let player = entry.player.trim().to_string();
            if player.is_empty() {
                return None;
            }
            Some(LineupEntry {
                position,
                player,
                team: side_team.to_string(),
            })
        })
        .collect()
}

pub fn strip_record_suffix(raw: &str) -> String {
    raw.split('(').next().unwrap_or_default().trim().to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub time: String,
    pub away_team: String,
    pub home_team: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub cells: Vec<String>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, cells: Vec<String>) -> Self {
        Self { headers, cells }
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() || self.cells.is_empty()
    }

    pub fn header_index(&self, label: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == label)
    }

    /// Fixed-width rows; a short trailing chunk is kept as its own row.
    pub fn rows(&self) -> Vec<&[String]> {
        if self.headers.is_empty() {
            return Vec::new();
        }
        self.cells.chunks(self.headers.len()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefenseRow {
    pub team: String,
    pub values: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefenseTable {
    pub position: Position,
    pub columns: Vec<String>,
    pub rows: Vec<DefenseRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedDefenseRow {
    pub team: String,
    pub values: BTreeMap<String, f64>,
    pub ranks: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedDefenseTable {
    pub position: Position,
    pub team_count: usize,
    pub rows: Vec<RankedDefenseRow>,
}

impl RankedDefenseTable {
    pub fn row_for_team(&self, team: &str) -> Option<&RankedDefenseRow> {
        let names: Vec<&str> = self.rows.iter().map(|r| r.team.as_str()).collect();
        teams::find_team(team, &names).map(|idx| &self.rows[idx])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerKey {
    pub player: String,
    pub player_team: String,
    pub opposing_team: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupAssignment {
    pub player: String,
    pub player_team: String,
    pub opposing_team: String,
    pub position: Position,
    pub ranks: BTreeMap<String, u32>,
}

impl MatchupAssignment {
    pub fn key(&self) -> PlayerKey {
        PlayerKey {
            player: self.player.clone(),
            player_team: self.player_team.clone(),
            opposing_team: self.opposing_team.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Venue {
    Home,
    Away,
}

impl Venue {
    pub fn from_marker(raw: &str) -> Self {
        if raw.trim() == "vs" { Venue::Home } else { Venue::Away }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameLogRow {
    pub date: String,
    pub player_team: String,
    pub venue: Venue,
    pub minutes: String,
    pub stats: Vec<(String, f64)>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalStats {
    pub game_log: Vec<GameLogRow>,
    pub averages: BTreeMap<String, f64>,
    pub games_played: usize,
}

impl HistoricalStats {
    pub fn empty(categories: &[String]) -> Self {
        Self {
            game_log: Vec::new(),
            averages: categories.iter().map(|c| (c.clone(), 0.0)).collect(),
            games_played: 0,
        }
    }

    // Blank without a sample.
    pub fn average(&self, category: &str) -> Option<f64> {
        if self.games_played == 0 {
            return None;
        }
        self.averages.get(category).copied()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonAverages {
    pub name: String,
    pub stats: BTreeMap<String, Option<f64>>,
}

impl SeasonAverages {
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    pub fn value(&self, category: &str) -> Option<f64> {
        self.stats.get(category).copied().flatten()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InjuryEntry {
    pub team: String,
    pub player: String,
    pub position: String,
    pub est_return: String,
    pub status_comment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatCell {
    pub category: String,
    pub delta: Option<f64>,
    pub rank: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub player: String,
    pub opposing_team: String,
    pub games_played: usize,
    pub cells: Vec<StatCell>,
    pub injury_note: String,
    pub statlines: String,
}

impl ReportRow {
    pub fn cell(&self, category: &str) -> Option<&StatCell> {
        self.cells.iter().find(|c| c.category == category)
    }

    pub fn has_signal(&self) -> bool {
        self.cells
            .iter()
            .any(|c| c.delta.is_some_and(|d| d != 0.0))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerGameLog {
    pub player: String,
    pub opposing_team: String,
    pub statlines: String,
    pub game_log: Vec<GameLogRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slate {
    pub date: NaiveDate,
    pub categories: Vec<String>,
    pub matchups: Vec<GameSummary>,
    pub rows: Vec<ReportRow>,
    pub game_logs: Vec<PlayerGameLog>,
}

impl Slate {
    pub fn date_key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}
