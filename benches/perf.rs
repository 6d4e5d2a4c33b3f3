use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use matchup_scout::defense_rankings::{competition_ranks, rank_defense_table};
use matchup_scout::model::{DefenseTable, Position, RawTable};
use matchup_scout::stat_table::aggregate_game_log;

const CATEGORIES: &[&str] = &["PTS", "REB", "AST", "3PM", "STL", "BLK"];

fn categories() -> Vec<String> {
    CATEGORIES.iter().map(|s| s.to_string()).collect()
}

fn sample_defense_raw() -> RawTable {
    let mut headers = vec!["Team".to_string()];
    headers.extend(categories());
    let mut cells = Vec::new();
    for team in 0..30 {
        cells.push(format!("Team {team}"));
        for (idx, _) in CATEGORIES.iter().enumerate() {
            // Coarse values so ties show up.
            let value = ((team * 7 + idx * 3) % 12) as f64 * 0.5 + 10.0;
            cells.push(format!("{value:.1}"));
        }
    }
    RawTable::new(headers, cells)
}

fn sample_game_log(games: usize) -> RawTable {
    let mut headers: Vec<String> = ["SEASON", "PLAYER", "RK", "DATE", "TM", "", "OPP", "MIN"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    headers.extend(categories());
    let mut cells = Vec::new();
    for game in 0..games + 2 {
        cells.extend(
            [
                "2024-25".to_string(),
                "Bench Player".to_string(),
                game.to_string(),
                format!("2024-11-{:02}", game % 28 + 1),
                "BOS".to_string(),
                if game % 2 == 0 { "vs" } else { "@" }.to_string(),
                "NYK".to_string(),
                "32:10".to_string(),
            ],
        );
        for idx in 0..CATEGORIES.len() {
            cells.push(((game + idx) % 25).to_string());
        }
    }
    RawTable::new(headers, cells)
}

fn bench_ranking(c: &mut Criterion) {
    let values: Vec<Option<f64>> = (0..30)
        .map(|i| if i % 11 == 0 { None } else { Some((i % 9) as f64) })
        .collect();
    c.bench_function("competition_ranks_30", |b| {
        b.iter(|| competition_ranks(black_box(&values)))
    });

    let raw = sample_defense_raw();
    let cats = categories();
    c.bench_function("rank_defense_table_30x6", |b| {
        b.iter(|| {
            let table = DefenseTable::from_raw(Position::PointGuard, black_box(&raw))
                .expect("valid table");
            rank_defense_table(&table, &cats).expect("all columns present")
        })
    });
}

fn bench_aggregation(c: &mut Criterion) {
    let table = sample_game_log(16);
    let cats = categories();
    c.bench_function("aggregate_game_log_16", |b| {
        b.iter(|| aggregate_game_log(Some(black_box(&table)), &cats))
    });
}

criterion_group!(benches, bench_ranking, bench_aggregation);
criterion_main!(benches);
