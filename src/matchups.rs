use std::collections::{BTreeMap, HashMap};

use crate::error::ScoutError;
use crate::model::{Game, LineupEntry, MatchupAssignment, Position, RankedDefenseTable};

/// Keeps only ranks at either end of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtremeBand {
    pub width: u32,
    /// Fixed league size for the bottom edge; `None` uses each table's team count.
    pub league_size: Option<usize>,
}

impl ExtremeBand {
    pub fn keeps(&self, rank: u32, team_count: usize) -> bool {
        let n = self.league_size.unwrap_or(team_count) as u32;
        rank <= self.width || rank + self.width > n
    }
}

/// Joins every lineup entry to the opposing team's ranks at the entry's
/// position. Home lineup entries come first, then away.
///
/// A team missing from a position table yields nothing for that position.
pub fn map_lineups_to_defense(
    games: &[Game],
    ranked: &HashMap<Position, RankedDefenseTable>,
    band: Option<ExtremeBand>,
) -> Vec<MatchupAssignment> {
    let mut out = Vec::new();
    for game in games {
        for entry in &game.home_lineup {
            if let Some(a) = assign(entry, &game.away_team, ranked, band) {
                out.push(a);
            }
        }
        for entry in &game.away_lineup {
            if let Some(a) = assign(entry, &game.home_team, ranked, band) {
                out.push(a);
            }
        }
    }
    out
}

fn assign(
    entry: &LineupEntry,
    defending_team: &str,
    ranked: &HashMap<Position, RankedDefenseTable>,
    band: Option<ExtremeBand>,
) -> Option<MatchupAssignment> {
    let table = ranked.get(&entry.position)?;
    let Some(row) = table.row_for_team(defending_team) else {
        let err = ScoutError::match_not_found(defending_team, entry.position);
        tracing::debug!(player = %entry.player, "{err}");
        return None;
    };

    let ranks: BTreeMap<String, u32> = row
        .ranks
        .iter()
        .filter(|(_, rank)| band.is_none_or(|b| b.keeps(**rank, table.team_count)))
        .map(|(stat, rank)| (stat.clone(), *rank))
        .collect();
    if ranks.is_empty() {
        return None;
    }

    Some(MatchupAssignment {
        player: entry.player.clone(),
        player_team: entry.team.clone(),
        opposing_team: defending_team.to_string(),
        position: entry.position,
        ranks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_edges_follow_team_count() {
        let band = ExtremeBand {
            width: 5,
            league_size: None,
        };
        assert!(band.keeps(1, 30));
        assert!(band.keeps(5, 30));
        assert!(!band.keeps(6, 30));
        assert!(!band.keeps(25, 30));
        assert!(band.keeps(26, 30));
        assert!(band.keeps(30, 30));
        assert!(band.keeps(8, 10));
    }

    #[test]
    fn fixed_league_size_overrides_team_count() {
        let band = ExtremeBand {
            width: 5,
            league_size: Some(30),
        };
        assert!(!band.keeps(10, 12));
    }
}
