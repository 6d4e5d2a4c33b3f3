//! Persistence of a finished slate.
//!
//! Both sinks replace the whole day: a rerun for the same date never leaves
//! rows from an earlier run next to the new ones. Writing is split in two:
//! every sink stages first, and only once all of them staged are they
//! promoted, so a failing sink leaves every other sink's day untouched.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::error::{ScoutError, ScoutResult};
use crate::model::{GameLogRow, ReportRow, Slate, StatCell};

pub const CSV_FILE: &str = "nba_slate.csv";
pub const XLSX_FILE: &str = "nba_slate.xlsx";
pub const MATCHUPS_FILE: &str = "matchups.json";
pub const STATLINES_DIR: &str = "statlines";

pub trait ReportSink {
    /// Does all fallible preparation without touching the stored day.
    fn stage(&mut self, slate: &Slate) -> ScoutResult<()>;

    /// Replaces the stored day with what was staged.
    fn promote(&mut self) -> ScoutResult<()>;

    /// Drops whatever `stage` left behind.
    fn discard(&mut self);

    fn describe(&self) -> String;

    fn commit(&mut self, slate: &Slate) -> ScoutResult<()> {
        if let Err(err) = self.stage(slate) {
            self.discard();
            return Err(err);
        }
        self.promote()
    }
}

/// Stages the slate in every sink, then promotes them in slice order.
/// Nothing is promoted unless every sink staged; a failed promote discards
/// the sinks after it.
pub fn commit_all(sinks: &mut [&mut dyn ReportSink], slate: &Slate) -> ScoutResult<()> {
    for idx in 0..sinks.len() {
        tracing::debug!(sink = %sinks[idx].describe(), "staging slate");
        if let Err(err) = sinks[idx].stage(slate) {
            tracing::warn!(sink = %sinks[idx].describe(), error = %err, "staging failed");
            for sink in sinks.iter_mut() {
                sink.discard();
            }
            return Err(err);
        }
    }
    for idx in 0..sinks.len() {
        if let Err(err) = sinks[idx].promote() {
            tracing::warn!(sink = %sinks[idx].describe(), error = %err, "promote failed");
            for sink in sinks[idx..].iter_mut() {
                sink.discard();
            }
            return Err(err);
        }
        tracing::info!(sink = %sinks[idx].describe(), "slate committed");
    }
    Ok(())
}

fn persistence(err: anyhow::Error) -> ScoutError {
    ScoutError::persistence(format!("{err:#}"))
}

/// Header plus one line per report row: `player, opposing_team,
/// games_played`, then `CAT, CAT_rank` per category, then the injury note
/// and the statlines key.
pub fn slate_table(slate: &Slate) -> Vec<Vec<String>> {
    let mut header = vec![
        "player".to_string(),
        "opposing_team".to_string(),
        "games_played".to_string(),
    ];
    for category in &slate.categories {
        header.push(category.clone());
        header.push(format!("{category}_rank"));
    }
    header.push("injury_note".to_string());
    header.push("statlines".to_string());

    let mut out = Vec::with_capacity(slate.rows.len() + 1);
    out.push(header);
    for row in &slate.rows {
        let mut line = vec![
            row.player.clone(),
            row.opposing_team.clone(),
            row.games_played.to_string(),
        ];
        for category in &slate.categories {
            let cell = row.cell(category);
            line.push(
                cell.and_then(|c| c.delta)
                    .map(|d| format!("{d:.1}"))
                    .unwrap_or_default(),
            );
            line.push(opt_to_string(cell.and_then(|c| c.rank)));
        }
        line.push(row.injury_note.clone());
        line.push(row.statlines.clone());
        out.push(line);
    }
    out
}

fn opt_to_string<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// SQLite

pub struct SqliteSink {
    conn: Connection,
    label: String,
    staged: Option<StagedSlate>,
}

impl SqliteSink {
    pub fn open(path: &Path) -> ScoutResult<Self> {
        open_db(path)
            .map(|conn| Self {
                conn,
                label: path.display().to_string(),
                staged: None,
            })
            .map_err(persistence)
    }

    pub fn in_memory() -> ScoutResult<Self> {
        let conn = Connection::open_in_memory()
            .context("open in-memory sqlite")
            .and_then(|conn| init_schema(&conn).map(|_| conn))
            .map_err(persistence)?;
        Ok(Self {
            conn,
            label: ":memory:".to_string(),
            staged: None,
        })
    }

    pub fn load_rows(&self, date: NaiveDate) -> ScoutResult<Vec<ReportRow>> {
        load_rows(&self.conn, &date_key(date)).map_err(persistence)
    }

    pub fn load_game_log(&self, date: NaiveDate, statlines: &str) -> ScoutResult<Option<Vec<GameLogRow>>> {
        load_game_log(&self.conn, &date_key(date), statlines).map_err(persistence)
    }

    /// Stored row count for the date, `None` if the date was never written.
    pub fn row_count(&self, date: NaiveDate) -> ScoutResult<Option<usize>> {
        self.conn
            .query_row(
                "SELECT row_count FROM slates WHERE slate_date = ?1",
                params![date_key(date)],
                |row| row.get::<_, i64>(0),
            )
            .optional()
            .map(|count| count.map(|n| n.max(0) as usize))
            .map_err(ScoutError::persistence)
    }
}

impl ReportSink for SqliteSink {
    fn stage(&mut self, slate: &Slate) -> ScoutResult<()> {
        self.staged = Some(encode_slate(slate).map_err(persistence)?);
        Ok(())
    }

    fn promote(&mut self) -> ScoutResult<()> {
        let staged = self
            .staged
            .take()
            .ok_or_else(|| ScoutError::Persistence("nothing staged".to_string()))?;
        replace_day(&mut self.conn, &staged).map_err(persistence)
    }

    fn discard(&mut self) {
        self.staged = None;
    }

    fn describe(&self) -> String {
        format!("sqlite {}", self.label)
    }
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS slates (
            slate_date TEXT PRIMARY KEY,
            categories_json TEXT NOT NULL,
            matchups_json TEXT NOT NULL,
            row_count INTEGER NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS report_rows (
            slate_date TEXT NOT NULL,
            player TEXT NOT NULL,
            opposing_team TEXT NOT NULL,
            games_played INTEGER NOT NULL,
            injury_note TEXT NOT NULL,
            statlines TEXT NOT NULL,
            cells_json TEXT NOT NULL,
            PRIMARY KEY (slate_date, player, opposing_team)
        );
        CREATE TABLE IF NOT EXISTS game_logs (
            slate_date TEXT NOT NULL,
            statlines TEXT NOT NULL,
            player TEXT NOT NULL,
            opposing_team TEXT NOT NULL,
            game_log_json TEXT NOT NULL,
            PRIMARY KEY (slate_date, statlines)
        );
        CREATE INDEX IF NOT EXISTS idx_report_rows_date ON report_rows(slate_date);
        CREATE INDEX IF NOT EXISTS idx_game_logs_date ON game_logs(slate_date);
        "#,
    )
    .context("init sqlite schema")?;
    Ok(())
}

struct StagedRow {
    player: String,
    opposing_team: String,
    games_played: i64,
    injury_note: String,
    statlines: String,
    cells_json: String,
}

struct StagedLog {
    statlines: String,
    player: String,
    opposing_team: String,
    game_log_json: String,
}

struct StagedSlate {
    day: String,
    categories_json: String,
    matchups_json: String,
    rows: Vec<StagedRow>,
    logs: Vec<StagedLog>,
}

fn encode_slate(slate: &Slate) -> Result<StagedSlate> {
    let rows = slate
        .rows
        .iter()
        .map(|row| {
            Ok(StagedRow {
                player: row.player.clone(),
                opposing_team: row.opposing_team.clone(),
                games_played: row.games_played as i64,
                injury_note: row.injury_note.clone(),
                statlines: row.statlines.clone(),
                cells_json: serde_json::to_string(&row.cells)
                    .with_context(|| format!("encode cells for {}", row.player))?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let logs = slate
        .game_logs
        .iter()
        .map(|log| {
            Ok(StagedLog {
                statlines: log.statlines.clone(),
                player: log.player.clone(),
                opposing_team: log.opposing_team.clone(),
                game_log_json: serde_json::to_string(&log.game_log)
                    .with_context(|| format!("encode game log {}", log.statlines))?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(StagedSlate {
        day: slate.date_key(),
        categories_json: serde_json::to_string(&slate.categories).context("encode categories")?,
        matchups_json: serde_json::to_string(&slate.matchups).context("encode matchups")?,
        rows,
        logs,
    })
}

fn replace_day(conn: &mut Connection, staged: &StagedSlate) -> Result<()> {
    let day = &staged.day;
    let tx = conn.transaction().context("begin slate transaction")?;
    tx.execute("DELETE FROM report_rows WHERE slate_date = ?1", params![day])
        .context("clear report rows")?;
    tx.execute("DELETE FROM game_logs WHERE slate_date = ?1", params![day])
        .context("clear game logs")?;
    tx.execute(
        r#"
        INSERT OR REPLACE INTO slates (slate_date, categories_json, matchups_json, row_count, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![
            day,
            staged.categories_json,
            staged.matchups_json,
            staged.rows.len() as i64,
            Utc::now().to_rfc3339()
        ],
    )
    .context("upsert slate")?;
    for row in &staged.rows {
        tx.execute(
            r#"
            INSERT OR REPLACE INTO report_rows (
                slate_date, player, opposing_team, games_played, injury_note, statlines, cells_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                day,
                row.player,
                row.opposing_team,
                row.games_played,
                row.injury_note,
                row.statlines,
                row.cells_json
            ],
        )
        .with_context(|| format!("insert row {}", row.player))?;
    }
    for log in &staged.logs {
        tx.execute(
            r#"
            INSERT OR REPLACE INTO game_logs (
                slate_date, statlines, player, opposing_team, game_log_json
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                day,
                log.statlines,
                log.player,
                log.opposing_team,
                log.game_log_json
            ],
        )
        .with_context(|| format!("insert game log {}", log.statlines))?;
    }
    tx.commit().context("commit slate transaction")?;
    Ok(())
}

fn load_rows(conn: &Connection, day: &str) -> Result<Vec<ReportRow>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT player, opposing_team, games_played, injury_note, statlines, cells_json
            FROM report_rows
            WHERE slate_date = ?1
            ORDER BY player, opposing_team
            "#,
        )
        .context("prepare row query")?;
    let raw = stmt
        .query_map(params![day], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })
        .context("query rows")?;

    let mut out = Vec::new();
    for item in raw {
        let (player, opposing_team, games_played, injury_note, statlines, cells_json) =
            item.context("read row")?;
        let cells: Vec<StatCell> = serde_json::from_str(&cells_json)
            .with_context(|| format!("decode cells for {player}"))?;
        out.push(ReportRow {
            player,
            opposing_team,
            games_played: games_played.max(0) as usize,
            cells,
            injury_note,
            statlines,
        });
    }
    Ok(out)
}

fn load_game_log(conn: &Connection, day: &str, statlines: &str) -> Result<Option<Vec<GameLogRow>>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT game_log_json FROM game_logs WHERE slate_date = ?1 AND statlines = ?2",
            params![day, statlines],
            |row| row.get(0),
        )
        .optional()
        .context("query game log")?;
    raw.map(|json| serde_json::from_str(&json).context("decode game log"))
        .transpose()
}

// ---------------------------------------------------------------------------
// Files

/// Writes `<root>/<YYYY-MM-DD>/` with the slate CSV and XLSX, the matchups
/// list and one JSON file per statlines key.
pub struct FileSink {
    root: PathBuf,
    staged: Option<(PathBuf, String)>,
}

impl FileSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            staged: None,
        }
    }

    fn staging_dir(&self, day: &str) -> PathBuf {
        self.root.join(format!(".{day}.staging"))
    }

    pub fn day_dir(&self, date: NaiveDate) -> PathBuf {
        self.root.join(date_key(date))
    }

    fn stage_day(&self, slate: &Slate) -> Result<PathBuf> {
        let day = slate.date_key();
        fs::create_dir_all(&self.root)
            .with_context(|| format!("create output root {}", self.root.display()))?;
        let staging = self.staging_dir(&day);
        if staging.exists() {
            fs::remove_dir_all(&staging)
                .with_context(|| format!("clear stale staging {}", staging.display()))?;
        }
        fs::create_dir_all(staging.join(STATLINES_DIR))
            .with_context(|| format!("create staging {}", staging.display()))?;

        if let Err(err) = write_files(&staging, slate) {
            fs::remove_dir_all(&staging).ok();
            return Err(err);
        }
        Ok(staging)
    }
}

impl ReportSink for FileSink {
    fn stage(&mut self, slate: &Slate) -> ScoutResult<()> {
        self.discard();
        let staging = self.stage_day(slate).map_err(persistence)?;
        self.staged = Some((staging, slate.date_key()));
        Ok(())
    }

    fn promote(&mut self) -> ScoutResult<()> {
        let (staging, day) = self
            .staged
            .take()
            .ok_or_else(|| ScoutError::Persistence("nothing staged".to_string()))?;
        swap_into_place(&staging, &self.root.join(&day), &self.root.join(format!(".{day}.old")))
            .map_err(persistence)
    }

    fn discard(&mut self) {
        if let Some((staging, _)) = self.staged.take() {
            fs::remove_dir_all(&staging).ok();
        }
    }

    fn describe(&self) -> String {
        format!("files {}", self.root.display())
    }
}

fn write_files(dir: &Path, slate: &Slate) -> Result<()> {
    let table = slate_table(slate);

    let csv_path = dir.join(CSV_FILE);
    let mut writer =
        csv::Writer::from_path(&csv_path).with_context(|| format!("create {}", csv_path.display()))?;
    for record in &table {
        writer.write_record(record).context("write csv record")?;
    }
    writer.flush().context("flush csv")?;

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Slate")?;
        write_rows(sheet, &table)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Matchups")?;
        let mut rows = vec![vec![
            "time".to_string(),
            "away_team".to_string(),
            "home_team".to_string(),
        ]];
        rows.extend(
            slate
                .matchups
                .iter()
                .map(|m| vec![m.time.clone(), m.away_team.clone(), m.home_team.clone()]),
        );
        write_rows(sheet, &rows)?;
    }
    let xlsx_path = dir.join(XLSX_FILE);
    workbook
        .save(&xlsx_path)
        .with_context(|| format!("save {}", xlsx_path.display()))?;

    write_json(&dir.join(MATCHUPS_FILE), &slate.matchups)?;
    for log in &slate.game_logs {
        write_json(
            &dir.join(STATLINES_DIR).join(format!("{}.json", log.statlines)),
            &log.game_log,
        )?;
    }
    Ok(())
}

fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let body = serde_json::to_string_pretty(value)
        .with_context(|| format!("encode {}", path.display()))?;
    fs::write(path, body).with_context(|| format!("write {}", path.display()))
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

/// Moves the previous day directory aside, promotes the staged one and only
/// then drops the old copy. On a failed promote the old copy is restored.
fn swap_into_place(staging: &Path, target: &Path, backup: &Path) -> Result<()> {
    if backup.exists() {
        fs::remove_dir_all(backup).with_context(|| format!("clear {}", backup.display()))?;
    }
    let had_previous = target.exists();
    if had_previous {
        fs::rename(target, backup).with_context(|| format!("move aside {}", target.display()))?;
    }
    if let Err(err) = fs::rename(staging, target) {
        if had_previous {
            fs::rename(backup, target).ok();
        }
        fs::remove_dir_all(staging).ok();
        return Err(err).with_context(|| format!("promote {}", target.display()));
    }
    if had_previous {
        fs::remove_dir_all(backup).ok();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GameSummary;

    fn slate() -> Slate {
        Slate {
            date: NaiveDate::from_ymd_opt(2024, 11, 2).unwrap(),
            categories: vec!["PTS".to_string(), "REB".to_string()],
            matchups: vec![GameSummary {
                time: "7:30 PM".to_string(),
                away_team: "NYK".to_string(),
                home_team: "BOS".to_string(),
            }],
            rows: vec![ReportRow {
                player: "Jalen Brunson".to_string(),
                opposing_team: "BOS".to_string(),
                games_played: 3,
                cells: vec![
                    StatCell {
                        category: "PTS".to_string(),
                        delta: Some(-2.0),
                        rank: Some(4),
                    },
                    StatCell {
                        category: "REB".to_string(),
                        delta: None,
                        rank: None,
                    },
                ],
                injury_note: String::new(),
                statlines: "Jalen_Brunson_vs_BOS_statlines".to_string(),
            }],
            game_logs: Vec::new(),
        }
    }

    #[test]
    fn table_has_delta_and_rank_pairs() {
        let table = slate_table(&slate());
        assert_eq!(
            table[0],
            vec![
                "player",
                "opposing_team",
                "games_played",
                "PTS",
                "PTS_rank",
                "REB",
                "REB_rank",
                "injury_note",
                "statlines"
            ]
        );
        assert_eq!(table[1][3], "-2.0");
        assert_eq!(table[1][4], "4");
        assert_eq!(table[1][5], "");
        assert_eq!(table[1][6], "");
    }

    #[test]
    fn promote_needs_a_staged_slate() {
        let mut db = SqliteSink::in_memory().unwrap();
        assert!(matches!(db.promote(), Err(ScoutError::Persistence(_))));

        db.stage(&slate()).unwrap();
        db.discard();
        assert!(matches!(db.promote(), Err(ScoutError::Persistence(_))));
        assert_eq!(db.row_count(slate().date).unwrap(), None);
    }
}
