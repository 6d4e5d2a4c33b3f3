use matchup_scout::model::RawTable;
use matchup_scout::season::normalize_season_averages;
use matchup_scout::stat_table::aggregate_game_log;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

const HEADERS: &[&str] = &["SEASON", "PLAYER", "RK", "DATE", "TM", "", "OPP", "MIN", "PTS", "REB"];

#[test]
fn summary_rows_are_not_games() {
    let table = RawTable::new(
        strings(HEADERS),
        strings(&[
            "2024-25", "A", "1", "2024-11-01", "BOS", "vs", "NYK", "30", "20", "5",
            "2024-25", "A", "2", "2024-11-08", "BOS", "@", "NYK", "32", "30", "7",
            "Season", "", "", "", "", "", "", "", "25", "6",
            "Career", "", "", "", "", "", "", "", "25", "6",
        ]),
    );
    let stats = aggregate_game_log(Some(&table), &strings(&["PTS", "REB"]));

    assert_eq!(stats.games_played, 2);
    assert_eq!(stats.game_log.len(), 2);
    assert_eq!(stats.average("PTS"), Some(25.0));
    assert_eq!(stats.average("REB"), Some(6.0));
}

#[test]
fn single_row_is_one_game() {
    let table = RawTable::new(
        strings(HEADERS),
        strings(&["2024-25", "A", "1", "2024-11-01", "BOS", "vs", "NYK", "30", "17", "4"]),
    );
    let stats = aggregate_game_log(Some(&table), &strings(&["PTS"]));

    assert_eq!(stats.games_played, 1);
    assert_eq!(stats.average("PTS"), Some(17.0));
}

#[test]
fn blank_cells_count_as_zero_games() {
    let table = RawTable::new(
        strings(HEADERS),
        strings(&[
            "2024-25", "A", "1", "2024-11-01", "BOS", "vs", "NYK", "30", "21", "5",
            "2024-25", "A", "2", "2024-11-08", "BOS", "@", "NYK", "12", "", "2",
            "2024-25", "A", "3", "2024-11-15", "BOS", "vs", "NYK", "28", "12", "3",
            "Season", "", "", "", "", "", "", "", "11", "3.3",
            "Career", "", "", "", "", "", "", "", "11", "3.3",
        ]),
    );
    let stats = aggregate_game_log(Some(&table), &strings(&["PTS", "REB"]));

    assert_eq!(stats.games_played, 3);
    assert_eq!(stats.average("PTS"), Some(11.0));
    assert_eq!(stats.average("REB"), Some(3.3));
}

#[test]
fn missing_stat_column_gives_an_empty_result() {
    let table = RawTable::new(
        strings(HEADERS),
        strings(&["2024-25", "A", "1", "2024-11-01", "BOS", "vs", "NYK", "30", "17", "4"]),
    );
    let stats = aggregate_game_log(Some(&table), &strings(&["PTS", "BLK"]));

    assert_eq!(stats.games_played, 0);
    assert!(stats.game_log.is_empty());
    assert_eq!(stats.averages.get("BLK"), Some(&0.0));
    assert_eq!(stats.average("PTS"), None);
}

#[test]
fn no_table_means_no_games() {
    let stats = aggregate_game_log(None, &strings(&["PTS"]));
    assert_eq!(stats.games_played, 0);
    assert_eq!(stats.averages.get("PTS"), Some(&0.0));
}

#[test]
fn season_snapshot_maps_display_keys() {
    let table = RawTable::new(
        strings(&["NAME", "PPG", "RPG", "APG", "SPG", "BPG", "3PM", "FG%"]),
        strings(&["Stephen Curry S. Curry", "26.4", "4.5", "5.1", "N/A", "0.4", "4.8", "45.0"]),
    );
    let season = normalize_season_averages(Some(&table));

    assert_eq!(season.name, "Stephen Curry");
    assert_eq!(season.value("PTS"), Some(26.4));
    assert_eq!(season.value("3PM"), Some(4.8));
    assert_eq!(season.value("STL"), None);
    assert!(season.stats.contains_key("STL"));
    assert!(!season.stats.contains_key("FG%"));
}

#[test]
fn absent_season_snapshot_is_empty() {
    let season = normalize_season_averages(None);
    assert!(season.is_empty());
    assert_eq!(season.name, "");
}
