use std::collections::HashMap;

use crate::model::{
    HistoricalStats, InjuryEntry, MatchupAssignment, PlayerGameLog, ReportRow, SeasonAverages,
    StatCell,
};
use crate::stat_table::round1;

#[derive(Debug, Clone)]
pub struct PlayerHistory {
    pub assignment: MatchupAssignment,
    pub historical: HistoricalStats,
    pub season: SeasonAverages,
}

/// Injury statuses keyed by exact player name; the first listing wins.
#[derive(Debug, Clone, Default)]
pub struct InjuryReport {
    notes: HashMap<String, String>,
}

impl InjuryReport {
    pub fn new(entries: Vec<InjuryEntry>) -> Self {
        let mut notes = HashMap::new();
        for entry in entries {
            notes.entry(entry.player).or_insert(entry.status_comment);
        }
        Self { notes }
    }

    pub fn note_for(&self, player: &str) -> &str {
        self.notes.get(player).map(String::as_str).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReportBuild {
    pub rows: Vec<ReportRow>,
    pub game_logs: Vec<PlayerGameLog>,
    pub skipped: usize,
    pub filtered: usize,
}

pub fn compute_delta(historical: Option<f64>, season: Option<f64>) -> Option<f64> {
    match (historical, season) {
        // `+ 0.0` folds a rounded -0.0 into 0.0.
        (Some(h), Some(s)) => Some(round1(h - s) + 0.0),
        _ => None,
    }
}

pub fn statlines_key(player: &str, opposing_team: &str) -> String {
    format!("{}_vs_{}_statlines", slug(player), slug(opposing_team))
}

fn slug(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

pub fn build_report(
    histories: &[PlayerHistory],
    injuries: &InjuryReport,
    categories: &[String],
) -> ReportBuild {
    let mut out = ReportBuild::default();

    for history in histories {
        let assignment = &history.assignment;
        if assignment.opposing_team.trim().is_empty() || history.season.is_empty() {
            tracing::warn!(player = %assignment.player, "skipping player without opponent or season data");
            out.skipped += 1;
            continue;
        }

        let player = if history.season.name.is_empty() {
            assignment.player.clone()
        } else {
            history.season.name.clone()
        };
        let statlines = statlines_key(&player, &assignment.opposing_team);

        let cells = categories
            .iter()
            .map(|category| match assignment.ranks.get(category) {
                Some(rank) => StatCell {
                    category: category.clone(),
                    delta: compute_delta(
                        history.historical.average(category),
                        history.season.value(category),
                    ),
                    rank: Some(*rank),
                },
                None => StatCell {
                    category: category.clone(),
                    delta: None,
                    rank: None,
                },
            })
            .collect();

        let row = ReportRow {
            injury_note: injuries.note_for(&player).to_string(),
            player: player.clone(),
            opposing_team: assignment.opposing_team.clone(),
            games_played: history.historical.games_played,
            cells,
            statlines: statlines.clone(),
        };

        out.game_logs.push(PlayerGameLog {
            player,
            opposing_team: assignment.opposing_team.clone(),
            statlines,
            game_log: history.historical.game_log.clone(),
        });

        if row.has_signal() {
            out.rows.push(row);
        } else {
            out.filtered += 1;
        }
    }

    out
}
