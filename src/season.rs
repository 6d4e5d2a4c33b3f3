use std::collections::BTreeMap;

use crate::model::{RawTable, SeasonAverages};
use crate::stat_table::parse_number;

/// Display abbreviation on the season snapshot -> stat key used everywhere else.
pub const SEASON_KEY_MAP: &[(&str, &str)] = &[
    ("PPG", "PTS"),
    ("RPG", "REB"),
    ("APG", "AST"),
    ("SPG", "STL"),
    ("BPG", "BLK"),
    ("3PM", "3PM"),
];

const NAME_HEADER: &str = "NAME";

/// Remaps a season snapshot to canonical stat keys and recovers the
/// player's full name. No table means no season data: empty name and map.
pub fn normalize_season_averages(table: Option<&RawTable>) -> SeasonAverages {
    let Some(table) = table.filter(|t| !t.headers.is_empty()) else {
        return SeasonAverages::default();
    };

    let snapshot: BTreeMap<&str, &str> = table
        .headers
        .iter()
        .map(|h| h.trim())
        .zip(table.cells.iter().map(|c| c.trim()))
        .collect();

    let stats = SEASON_KEY_MAP
        .iter()
        .filter_map(|(display, canonical)| {
            snapshot
                .get(display)
                .map(|raw| (canonical.to_string(), parse_number(raw)))
        })
        .collect();

    let name = snapshot
        .get(NAME_HEADER)
        .map(|raw| recover_full_name(raw))
        .unwrap_or_default();

    SeasonAverages { name, stats }
}

/// `"Stephen Curry S. Curry"` -> `"Stephen Curry"`: keep the text before the
/// first period and drop its last token (the abbreviated first initial).
/// Names without a period are taken as-is.
pub fn recover_full_name(display: &str) -> String {
    let display = display.trim();
    let Some((head, _)) = display.split_once('.') else {
        return display.to_string();
    };
    let parts: Vec<&str> = head.split_whitespace().collect();
    match parts.split_last() {
        Some((_, rest)) => rest.join(" "),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbreviated_suffix_is_dropped() {
        assert_eq!(recover_full_name("Stephen Curry S. Curry"), "Stephen Curry");
        assert_eq!(recover_full_name("Karl-Anthony Towns K. Towns"), "Karl-Anthony Towns");
        assert_eq!(recover_full_name("Nikola Jokic"), "Nikola Jokic");
        assert_eq!(recover_full_name(""), "");
    }
}
