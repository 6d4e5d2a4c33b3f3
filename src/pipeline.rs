use std::collections::{BTreeMap, HashMap};

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::config::ScoutConfig;
use crate::defense_rankings::rank_defense_table;
use crate::matchups::map_lineups_to_defense;
use crate::model::{
    DefenseTable, Game, HistoricalStats, MatchupAssignment, PlayerKey, Position,
    RankedDefenseTable, SeasonAverages, Slate,
};
use crate::report::{InjuryReport, PlayerHistory, build_report};
use crate::season::normalize_season_averages;
use crate::sources::{
    DefenseSource, HistoryQuery, InjurySource, LineupSource, SeasonQuery, StatTableSource,
};
use crate::stat_table::aggregate_game_log;

pub struct Sources<'a> {
    pub lineups: &'a dyn LineupSource,
    pub defense: &'a dyn DefenseSource,
    pub stats: &'a dyn StatTableSource,
    pub injuries: &'a dyn InjurySource,
}

impl<'a> Sources<'a> {
    pub fn from_one<S>(source: &'a S) -> Self
    where
        S: LineupSource + DefenseSource + StatTableSource + InjurySource,
    {
        Self {
            lineups: source,
            defense: source,
            stats: source,
            injuries: source,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub games: usize,
    pub games_rejected: usize,
    pub positions_ranked: usize,
    pub position_errors: Vec<String>,
    pub assignments: usize,
    pub players_fetched: usize,
    pub lookup_errors: Vec<String>,
    pub injuries: usize,
    pub rows: usize,
    pub rows_filtered: usize,
    pub players_skipped: usize,
}

/// Runs every stage up to, not including, persistence.
///
/// Only a lineup fetch failure is returned as an error; everything after it
/// degrades per position or per player.
pub fn build_slate(cfg: &ScoutConfig, sources: &Sources<'_>) -> Result<(Slate, RunSummary)> {
    let mut summary = RunSummary::default();

    tracing::info!("fetching lineups");
    let raw_games = sources.lineups.fetch_games().context("lineup source failed")?;
    let mut games: Vec<Game> = Vec::with_capacity(raw_games.len());
    for raw in raw_games {
        let label = format!("{} @ {}", raw.away_team, raw.home_team);
        match raw.into_game() {
            Some(game) => games.push(game),
            None => {
                tracing::warn!(game = %label, "rejecting game without two distinct teams");
                summary.games_rejected += 1;
            }
        }
    }
    summary.games = games.len();

    tracing::info!(positions = cfg.positions.len(), "ranking defense vs position");
    let ranked = rank_positions(cfg, sources.defense, &mut summary.position_errors);
    summary.positions_ranked = ranked.len();

    tracing::info!("mapping players to opposing defense");
    let assignments = map_lineups_to_defense(&games, &ranked, cfg.extreme_band);
    summary.assignments = assignments.len();

    tracing::info!(players = assignments.len(), threads = cfg.fetch_parallelism, "fetching player history");
    let histories = gather_histories(cfg, sources.stats, &assignments, &mut summary);

    tracing::info!("fetching injury report");
    let injuries = match sources.injuries.fetch_injuries() {
        Ok(entries) => InjuryReport::new(entries),
        Err(err) => {
            tracing::warn!(error = %err, "injury report unavailable");
            InjuryReport::default()
        }
    };
    summary.injuries = injuries.len();

    tracing::info!("finalizing table");
    let mut build = build_report(&histories, &injuries, &cfg.categories);
    build
        .rows
        .sort_by(|a, b| a.player.cmp(&b.player).then(a.opposing_team.cmp(&b.opposing_team)));
    build.game_logs.sort_by(|a, b| a.statlines.cmp(&b.statlines));
    summary.rows = build.rows.len();
    summary.rows_filtered = build.filtered;
    summary.players_skipped = build.skipped;

    let slate = Slate {
        date: cfg.date,
        categories: cfg.categories.clone(),
        matchups: games.iter().map(Game::summary).collect(),
        rows: build.rows,
        game_logs: build.game_logs,
    };
    Ok((slate, summary))
}

/// Ranked tables for every configured position that could be read;
/// failures are collected and the position is left out.
pub fn rank_positions(
    cfg: &ScoutConfig,
    source: &dyn DefenseSource,
    errors: &mut Vec<String>,
) -> HashMap<Position, RankedDefenseTable> {
    let mut out = HashMap::new();
    for &position in &cfg.positions {
        match rank_position(position, source, &cfg.categories) {
            Ok(table) => {
                out.insert(position, table);
            }
            Err(err) => {
                tracing::warn!(position = %position, error = %err, "skipping position");
                errors.push(format!("{position}: {err}"));
            }
        }
    }
    out
}

fn rank_position(
    position: Position,
    source: &dyn DefenseSource,
    categories: &[String],
) -> Result<RankedDefenseTable> {
    let raw = source
        .fetch_defense_table(position)
        .with_context(|| format!("defense table {position}"))?;
    let table = DefenseTable::from_raw(position, &raw)?;
    Ok(rank_defense_table(&table, categories)?)
}

struct PlayerLookup {
    historical: HistoricalStats,
    season: SeasonAverages,
    errors: Vec<String>,
}

fn gather_histories(
    cfg: &ScoutConfig,
    source: &dyn StatTableSource,
    assignments: &[MatchupAssignment],
    summary: &mut RunSummary,
) -> Vec<PlayerHistory> {
    let mut unique: BTreeMap<PlayerKey, &MatchupAssignment> = BTreeMap::new();
    for assignment in assignments {
        unique.entry(assignment.key()).or_insert(assignment);
    }
    let jobs: Vec<(PlayerKey, &MatchupAssignment)> = unique.into_iter().collect();

    let results: Vec<(PlayerKey, PlayerLookup)> = with_fetch_pool(cfg.fetch_parallelism, || {
        jobs.par_iter()
            .map(|(key, assignment)| (key.clone(), lookup_player(source, assignment, &cfg.categories)))
            .collect()
    });

    let mut by_key: HashMap<PlayerKey, PlayerLookup> = HashMap::with_capacity(results.len());
    for (key, lookup) in results {
        summary.lookup_errors.extend(lookup.errors.iter().cloned());
        by_key.insert(key, lookup);
    }
    summary.players_fetched = by_key.len();

    assignments
        .iter()
        .filter_map(|assignment| {
            let lookup = by_key.get(&assignment.key())?;
            Some(PlayerHistory {
                assignment: assignment.clone(),
                historical: lookup.historical.clone(),
                season: lookup.season.clone(),
            })
        })
        .collect()
}

fn lookup_player(
    source: &dyn StatTableSource,
    assignment: &MatchupAssignment,
    categories: &[String],
) -> PlayerLookup {
    let mut errors = Vec::new();
    let requested: Vec<String> = categories
        .iter()
        .filter(|c| assignment.ranks.contains_key(*c))
        .cloned()
        .collect();

    let history = match source.fetch_history(&HistoryQuery::for_assignment(assignment)) {
        Ok(table) => table,
        Err(err) => {
            tracing::warn!(player = %assignment.player, error = %err, "history lookup failed");
            errors.push(format!("{} history: {err}", assignment.player));
            None
        }
    };
    let season = match source.fetch_season(&SeasonQuery::for_assignment(assignment)) {
        Ok(table) => table,
        Err(err) => {
            tracing::warn!(player = %assignment.player, error = %err, "season lookup failed");
            errors.push(format!("{} season: {err}", assignment.player));
            None
        }
    };

    PlayerLookup {
        historical: aggregate_game_log(history.as_ref(), &requested),
        season: normalize_season_averages(season.as_ref()),
        errors,
    }
}

fn with_fetch_pool<T>(threads: usize, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(action),
        Err(_) => action(),
    }
}

