//! Upstream collaborators as seen by the pipeline.
//!
//! Markup scraping lives outside this crate; a source only has to hand over
//! lineups, per-position defense tables, generic stat tables and the injury
//! list. [`SnapshotSource`] reads a directory of JSON files captured from
//! those collaborators.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use crate::model::{InjuryEntry, MatchupAssignment, Position, RawGame, RawTable};

pub trait LineupSource {
    fn fetch_games(&self) -> Result<Vec<RawGame>>;
}

pub trait DefenseSource {
    fn fetch_defense_table(&self, position: Position) -> Result<RawTable>;
}

/// Per-player lookups; called from the fetch pool, hence `Sync`.
pub trait StatTableSource: Sync {
    fn fetch_history(&self, query: &HistoryQuery) -> Result<Option<RawTable>>;
    fn fetch_season(&self, query: &SeasonQuery) -> Result<Option<RawTable>>;
}

pub trait InjurySource {
    fn fetch_injuries(&self) -> Result<Vec<InjuryEntry>>;
}

/// A player's games against one opponent over the last two seasons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    pub player: String,
    pub player_team: String,
    pub opposing_team: String,
}

impl HistoryQuery {
    pub fn for_assignment(assignment: &MatchupAssignment) -> Self {
        Self {
            player: assignment.player.clone(),
            player_team: assignment.player_team.clone(),
            opposing_team: assignment.opposing_team.clone(),
        }
    }

    pub fn phrase(&self) -> String {
        format!(
            "{} {} vs {} last 2 years including playoffs",
            self.player_team,
            slug(&self.player),
            self.opposing_team
        )
    }

    pub fn file_key(&self) -> String {
        format!("{}-vs-{}", slug(&self.player), slug(&self.opposing_team))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonQuery {
    pub player: String,
    pub player_team: String,
}

impl SeasonQuery {
    pub fn for_assignment(assignment: &MatchupAssignment) -> Self {
        Self {
            player: assignment.player.clone(),
            player_team: assignment.player_team.clone(),
        }
    }

    pub fn phrase(&self) -> String {
        format!("{} {} averages this season", self.player_team, slug(&self.player))
    }

    pub fn file_key(&self) -> String {
        slug(&self.player)
    }
}

/// `"LeBron James"` -> `"lebron-james"`.
pub fn slug(raw: &str) -> String {
    raw.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
}

/// Reads `lineups.json`, `defense/<POS>.json`, `injuries.json`,
/// `history/<player>-vs-<opponent>.json` and `season/<player>.json`.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    root: PathBuf,
}

impl SnapshotSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read_json<T: DeserializeOwned>(&self, rel: &Path) -> Result<T> {
        let path = self.root.join(rel);
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("read snapshot {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("invalid snapshot json {}", path.display()))
    }

    fn read_optional_table(&self, rel: PathBuf) -> Result<Option<RawTable>> {
        if !self.root.join(&rel).exists() {
            return Ok(None);
        }
        let table: Option<RawTable> = self.read_json(&rel)?;
        Ok(table.filter(|t| !t.is_empty()))
    }
}

impl LineupSource for SnapshotSource {
    fn fetch_games(&self) -> Result<Vec<RawGame>> {
        self.read_json(Path::new("lineups.json"))
    }
}

impl DefenseSource for SnapshotSource {
    fn fetch_defense_table(&self, position: Position) -> Result<RawTable> {
        self.read_json(&Path::new("defense").join(format!("{}.json", position.code())))
    }
}

impl StatTableSource for SnapshotSource {
    fn fetch_history(&self, query: &HistoryQuery) -> Result<Option<RawTable>> {
        self.read_optional_table(Path::new("history").join(format!("{}.json", query.file_key())))
    }

    fn fetch_season(&self, query: &SeasonQuery) -> Result<Option<RawTable>> {
        self.read_optional_table(Path::new("season").join(format!("{}.json", query.file_key())))
    }
}

impl InjurySource for SnapshotSource {
    fn fetch_injuries(&self) -> Result<Vec<InjuryEntry>> {
        if !self.root.join("injuries.json").exists() {
            return Ok(Vec::new());
        }
        self.read_json(Path::new("injuries.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_phrasing_matches_lookup_style() {
        let q = HistoryQuery {
            player: "LeBron James".to_string(),
            player_team: "LAL".to_string(),
            opposing_team: "Boston Celtics".to_string(),
        };
        assert_eq!(
            q.phrase(),
            "LAL lebron-james vs Boston Celtics last 2 years including playoffs"
        );
        assert_eq!(q.file_key(), "lebron-james-vs-boston-celtics");

        let s = SeasonQuery {
            player: "LeBron James".to_string(),
            player_team: "LAL".to_string(),
        };
        assert_eq!(s.phrase(), "LAL lebron-james averages this season");
        assert_eq!(s.file_key(), "lebron-james");
    }
}
