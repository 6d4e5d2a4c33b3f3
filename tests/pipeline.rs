use std::collections::HashMap;
use std::path::PathBuf;

use chrono::NaiveDate;

use matchup_scout::config::ScoutConfig;
use matchup_scout::model::{Slate, Venue};
use matchup_scout::pipeline::{RunSummary, Sources, build_slate};
use matchup_scout::sources::SnapshotSource;

fn snapshot_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("snapshot");
    path
}

fn config(extra: &[(&str, &str)]) -> ScoutConfig {
    let mut env: HashMap<String, String> = HashMap::new();
    env.insert("SCOUT_CATEGORIES".to_string(), "PTS,REB".to_string());
    env.insert("SCOUT_POSITIONS".to_string(), "PG,C".to_string());
    for (k, v) in extra {
        env.insert(k.to_string(), v.to_string());
    }
    let mut cfg = ScoutConfig::from_lookup(|key| env.get(key).cloned());
    cfg.date = NaiveDate::from_ymd_opt(2024, 11, 2).unwrap();
    cfg
}

fn run(cfg: &ScoutConfig) -> (Slate, RunSummary) {
    let source = SnapshotSource::new(snapshot_dir());
    build_slate(cfg, &Sources::from_one(&source)).expect("snapshot run should succeed")
}

#[test]
fn snapshot_run_builds_filtered_rows() {
    let (slate, summary) = run(&config(&[]));

    assert_eq!(summary.games, 1);
    assert_eq!(summary.games_rejected, 1);
    assert_eq!(summary.positions_ranked, 2);
    assert_eq!(summary.assignments, 4);
    assert_eq!(summary.players_fetched, 4);
    assert_eq!(summary.rows, 2);
    assert_eq!(summary.rows_filtered, 2);
    assert_eq!(summary.players_skipped, 0);

    assert_eq!(slate.matchups.len(), 1);
    assert_eq!(slate.matchups[0].away_team, "New York Knicks");
    assert_eq!(slate.matchups[0].home_team, "Boston Celtics");

    let names: Vec<&str> = slate.rows.iter().map(|r| r.player.as_str()).collect();
    assert_eq!(names, vec!["Jalen Brunson", "Jrue Holiday"]);

    let brunson = &slate.rows[0];
    assert_eq!(brunson.opposing_team, "Boston Celtics");
    assert_eq!(brunson.games_played, 1);
    assert_eq!(brunson.injury_note, "Day-To-Day (ankle)");
    assert_eq!(brunson.statlines, "Jalen_Brunson_vs_Boston_Celtics_statlines");
    let pts = brunson.cell("PTS").unwrap();
    assert_eq!(pts.delta, Some(2.0));
    assert_eq!(pts.rank, Some(1));
    assert_eq!(brunson.cell("REB").unwrap().delta, Some(0.0));

    let holiday = &slate.rows[1];
    assert_eq!(holiday.opposing_team, "New York Knicks");
    assert_eq!(holiday.games_played, 2);
    assert_eq!(holiday.cell("PTS").unwrap().delta, Some(-2.5));
    assert_eq!(holiday.cell("PTS").unwrap().rank, Some(3));
    assert_eq!(holiday.cell("REB").unwrap().delta, Some(1.4));
    assert_eq!(holiday.injury_note, "");
}

#[test]
fn game_logs_are_kept_for_filtered_players() {
    let (slate, _) = run(&config(&[]));

    let keys: Vec<&str> = slate.game_logs.iter().map(|g| g.statlines.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "Jalen_Brunson_vs_Boston_Celtics_statlines",
            "Jrue_Holiday_vs_New_York_Knicks_statlines",
            "Karl_Anthony_Towns_vs_Boston_Celtics_statlines",
            "Kristaps_Porzingis_vs_New_York_Knicks_statlines",
        ]
    );

    let holiday = &slate.game_logs[1];
    assert_eq!(holiday.game_log.len(), 2);
    assert_eq!(holiday.game_log[0].date, "2024-12-25");
    assert_eq!(holiday.game_log[0].venue, Venue::Home);
    assert_eq!(holiday.game_log[1].venue, Venue::Away);
    assert_eq!(holiday.game_log[1].minutes, "30:02");
    assert_eq!(
        holiday.game_log[1].stats,
        vec![("PTS".to_string(), 0.0), ("REB".to_string(), 7.0)]
    );

    assert!(slate.game_logs[3].game_log.is_empty());
}

#[test]
fn extreme_band_drops_middle_ranks() {
    let (slate, summary) = run(&config(&[("SCOUT_EXTREME_BAND", "1")]));

    // Three teams per table: only ranks 1 and 3 survive.
    assert_eq!(summary.assignments, 3);
    assert!(
        slate
            .game_logs
            .iter()
            .all(|g| !g.statlines.starts_with("Karl_Anthony_Towns"))
    );
}

#[test]
fn missing_position_table_is_skipped() {
    let (slate, summary) = run(&config(&[("SCOUT_POSITIONS", "PG,SG,C")]));

    assert_eq!(summary.positions_ranked, 2);
    assert_eq!(summary.position_errors.len(), 1);
    assert!(summary.position_errors[0].starts_with("SG"));
    assert_eq!(slate.rows.len(), 2);
}

#[test]
fn missing_stat_column_skips_the_position() {
    let (_, summary) = run(&config(&[("SCOUT_CATEGORIES", "PTS,AST")]));

    assert_eq!(summary.positions_ranked, 0);
    assert_eq!(summary.position_errors.len(), 2);
    assert_eq!(summary.assignments, 0);
}

#[test]
fn missing_lineups_abort_the_run() {
    let cfg = config(&[]);
    let source = SnapshotSource::new(snapshot_dir().join("does-not-exist"));
    assert!(build_slate(&cfg, &Sources::from_one(&source)).is_err());
}

#[test]
fn reruns_produce_the_same_slate() {
    let cfg = config(&[("FETCH_PARALLELISM", "8")]);
    let (first, _) = run(&cfg);
    let (second, _) = run(&cfg);
    assert_eq!(first, second);
}
