use anyhow::{Result, anyhow};

use matchup_scout::config::{ScoutConfig, Upstream, arg_value};
use matchup_scout::model::{Position, RankedDefenseTable};
use matchup_scout::pipeline::rank_positions;
use matchup_scout::remote_source::RemoteSource;
use matchup_scout::sources::SnapshotSource;
use matchup_scout::teams;

/// Prints the defense-vs-position ranks for one or all positions.
///
/// `dvp_ranks --snapshot DIR [--pos PG] [--categories PTS,REB]`
fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut cfg = ScoutConfig::from_env();
    cfg.apply_args(&args)?;
    if let Some(raw) = arg_value(&args, "--pos") {
        let position =
            Position::from_code(&raw).ok_or_else(|| anyhow!("unknown position {raw:?}"))?;
        cfg.positions = vec![position];
    }

    let mut errors = Vec::new();
    let ranked = match cfg.upstream()? {
        Upstream::Snapshot(dir) => rank_positions(&cfg, &SnapshotSource::new(dir), &mut errors),
        Upstream::Remote(url) => {
            let source = RemoteSource::new(&url, cfg.request_timeout, cfg.request_retries)?;
            rank_positions(&cfg, &source, &mut errors)
        }
    };

    for position in &cfg.positions {
        let Some(table) = ranked.get(position) else {
            continue;
        };
        print_table(table, &cfg.categories);
    }
    if !errors.is_empty() {
        println!("errors: {}", errors.len());
        for err in &errors {
            println!(" - {err}");
        }
    }
    Ok(())
}

fn print_table(table: &RankedDefenseTable, categories: &[String]) {
    println!("{} ({} teams)", table.position, table.team_count);
    if table.team_count != teams::league_size() {
        println!("  note: league has {} teams", teams::league_size());
    }
    let mut header = format!("{:<28}", "team");
    for category in categories {
        header.push_str(&format!("{category:>12}"));
    }
    println!("{header}");

    let mut rows = table.rows.iter().collect::<Vec<_>>();
    if let Some(first) = categories.first() {
        rows.sort_by_key(|row| row.ranks.get(first).copied().unwrap_or(u32::MAX));
    }
    for row in rows {
        let mut line = format!("{:<28}", row.team);
        for category in categories {
            let cell = match (row.values.get(category), row.ranks.get(category)) {
                (Some(value), Some(rank)) => format!("{value:.1} #{rank}"),
                _ => "-".to_string(),
            };
            line.push_str(&format!("{cell:>12}"));
        }
        println!("{line}");
    }
    println!();
}
