use std::collections::BTreeMap;

use crate::model::{GameLogRow, HistoricalStats, RawTable, Venue};

/// How many rows of a reshaped game-log table are real games.
///
/// Upstream game logs end with two summary rows (season and career totals)
/// unless the table holds a single game, in which case there is no summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableShape {
    Empty,
    SingleGame,
    GamesWithSummary { games: usize },
}

const SUMMARY_ROWS: usize = 2;

pub fn classify_shape(row_count: usize) -> TableShape {
    match row_count {
        0 => TableShape::Empty,
        1 => TableShape::SingleGame,
        n => TableShape::GamesWithSummary {
            games: n.saturating_sub(SUMMARY_ROWS),
        },
    }
}

impl TableShape {
    pub fn games_played(self) -> usize {
        match self {
            TableShape::Empty => 0,
            TableShape::SingleGame => 1,
            TableShape::GamesWithSummary { games } => games,
        }
    }
}

/// Column positions of the context fields. Labels win over the fixed
/// upstream layout (date 3, team 4, home/away marker 5, minutes 7).
#[derive(Debug, Clone, Copy)]
struct GameLogLayout {
    date: usize,
    team: usize,
    venue: usize,
    minutes: usize,
}

impl GameLogLayout {
    fn resolve(table: &RawTable) -> Self {
        Self {
            date: table.header_index("DATE").unwrap_or(3),
            team: table.header_index("TM").unwrap_or(4),
            venue: table
                .header_index("OPP")
                .and_then(|idx| idx.checked_sub(1))
                .unwrap_or(5),
            minutes: table.header_index("MIN").unwrap_or(7),
        }
    }
}

/// Game log and per-stat averages of a player against one opponent.
///
/// Best effort: a missing table, or one lacking a requested stat column,
/// yields an empty log with zero averages.
pub fn aggregate_game_log(table: Option<&RawTable>, categories: &[String]) -> HistoricalStats {
    let Some(table) = table.filter(|t| !t.is_empty()) else {
        return HistoricalStats::empty(categories);
    };

    let mut stat_columns = Vec::with_capacity(categories.len());
    for category in categories {
        match table.header_index(category) {
            Some(idx) => stat_columns.push((category.clone(), idx)),
            None => {
                tracing::warn!(stat = %category, "game log table has no column for stat");
                return HistoricalStats::empty(categories);
            }
        }
    }

    let rows = table.rows();
    let shape = classify_shape(rows.len());
    let games_played = shape.games_played();
    let layout = GameLogLayout::resolve(table);

    let mut sums: BTreeMap<String, f64> = categories.iter().map(|c| (c.clone(), 0.0)).collect();
    let mut game_log = Vec::with_capacity(games_played);

    for row in rows.iter().take(games_played) {
        let mut stats = Vec::with_capacity(stat_columns.len());
        for (category, idx) in &stat_columns {
            let value = stat_cell_value(cell(row, *idx));
            if let Some(sum) = sums.get_mut(category) {
                *sum += value;
            }
            stats.push((category.clone(), value));
        }
        game_log.push(GameLogRow {
            date: cell(row, layout.date).to_string(),
            player_team: cell(row, layout.team).to_string(),
            venue: Venue::from_marker(cell(row, layout.venue)),
            minutes: cell(row, layout.minutes).to_string(),
            stats,
        });
    }

    let averages = sums
        .into_iter()
        .map(|(category, sum)| {
            let avg = if games_played > 0 {
                round1(sum / games_played as f64)
            } else {
                0.0
            };
            (category, avg)
        })
        .collect();

    HistoricalStats {
        game_log,
        averages,
        games_played,
    }
}

fn cell<'a>(row: &'a [String], idx: usize) -> &'a str {
    row.get(idx).map(|c| c.trim()).unwrap_or_default()
}

/// Blank cells count as a zero game, not as missing data.
fn stat_cell_value(raw: &str) -> f64 {
    if raw.is_empty() {
        return 0.0;
    }
    parse_number(raw).unwrap_or_else(|| {
        tracing::debug!(cell = raw, "unreadable stat cell counted as zero");
        0.0
    })
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() || s == "-" {
        return None;
    }
    // Only a leading sign, a trailing percent and thousands commas are decoration.
    let s = s.strip_prefix('+').unwrap_or(s);
    let s = s.strip_suffix('%').unwrap_or(s).trim_end();
    let cleaned = s.replace(',', "");
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_classifier_handles_small_tables() {
        assert_eq!(classify_shape(0), TableShape::Empty);
        assert_eq!(classify_shape(1), TableShape::SingleGame);
        assert_eq!(classify_shape(2).games_played(), 0);
        assert_eq!(classify_shape(3).games_played(), 1);
        assert_eq!(classify_shape(7).games_played(), 5);
    }

    #[test]
    fn rounding_is_to_one_decimal() {
        assert_eq!(round1(25.04), 25.0);
        assert_eq!(round1(7.0 / 3.0), 2.3);
        assert_eq!(round1(-0.26), -0.3);
    }

    #[test]
    fn parse_number_strips_decorations() {
        assert_eq!(parse_number("1,204"), Some(1204.0));
        assert_eq!(parse_number(" 22.5 "), Some(22.5));
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("N/A"), None);
        assert_eq!(parse_number("+3.5"), Some(3.5));
        assert_eq!(parse_number("45.0%"), Some(45.0));
    }

    #[test]
    fn parse_number_rejects_separate_number_groups() {
        assert_eq!(parse_number("12 (3)"), None);
        assert_eq!(parse_number("7-12"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn blank_and_garbage_cells_are_zero() {
        assert_eq!(stat_cell_value(""), 0.0);
        assert_eq!(stat_cell_value("DNP"), 0.0);
        assert_eq!(stat_cell_value("12"), 12.0);
    }
}
