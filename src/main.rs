use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use matchup_scout::config::{ScoutConfig, Upstream};
use matchup_scout::pipeline::{RunSummary, Sources, build_slate};
use matchup_scout::remote_source::RemoteSource;
use matchup_scout::sink::{FileSink, ReportSink, SqliteSink, commit_all};
use matchup_scout::sources::SnapshotSource;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_logging();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut cfg = ScoutConfig::from_env();
    cfg.apply_args(&args)?;

    let (slate, summary) = match cfg.upstream()? {
        Upstream::Snapshot(dir) => {
            tracing::info!(dir = %dir.display(), "reading snapshot");
            let source = SnapshotSource::new(dir);
            build_slate(&cfg, &Sources::from_one(&source))?
        }
        Upstream::Remote(url) => {
            tracing::info!(url = %url, "using remote upstream");
            let source = RemoteSource::new(&url, cfg.request_timeout, cfg.request_retries)?;
            build_slate(&cfg, &Sources::from_one(&source))?
        }
    };

    let db_path = cfg.resolved_db_path()?;
    let mut db = SqliteSink::open(&db_path)?;
    let mut files = cfg.output_dir.clone().map(FileSink::new);

    // The staged directory is promoted after the database transaction.
    let mut sinks: Vec<&mut dyn ReportSink> = Vec::new();
    sinks.push(&mut db);
    if let Some(files) = files.as_mut() {
        sinks.push(files);
    }
    commit_all(&mut sinks, &slate).context("persisting slate")?;

    let written = sinks.iter().map(|s| s.describe()).collect::<Vec<_>>();
    print_summary(&slate.date_key(), &summary, &written);
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,matchup_scout=info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_summary(day: &str, summary: &RunSummary, sinks: &[String]) {
    println!("Slate {day} complete");
    for sink in sinks {
        println!("Wrote: {sink}");
    }
    println!(
        "Games: {} (rejected {})",
        summary.games, summary.games_rejected
    );
    println!("Positions ranked: {}", summary.positions_ranked);
    println!("Assignments: {}", summary.assignments);
    println!("Players fetched: {}", summary.players_fetched);
    println!("Injuries listed: {}", summary.injuries);
    println!(
        "Rows: {} (filtered {}, skipped {})",
        summary.rows, summary.rows_filtered, summary.players_skipped
    );

    let errors = summary
        .position_errors
        .iter()
        .chain(summary.lookup_errors.iter())
        .collect::<Vec<_>>();
    if !errors.is_empty() {
        println!("  errors: {}", errors.len());
        for err in errors.iter().take(6) {
            println!("   - {err}");
        }
    }
}
