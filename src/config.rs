use std::path::PathBuf;
use std::time::Duration;

use chrono::{Local, NaiveDate};

use crate::error::{ScoutError, ScoutResult};
use crate::matchups::ExtremeBand;
use crate::model::Position;

pub const DEFAULT_CATEGORIES: &[&str] = &["PTS", "REB", "AST", "3PM", "STL", "BLK"];

const APP_DIR: &str = "matchup_scout";
const DB_FILE: &str = "slates.sqlite";

/// Where upstream tables come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upstream {
    Snapshot(PathBuf),
    Remote(String),
}

#[derive(Debug, Clone)]
pub struct ScoutConfig {
    pub categories: Vec<String>,
    pub positions: Vec<Position>,
    pub extreme_band: Option<ExtremeBand>,
    pub league_size: Option<usize>,
    pub fetch_parallelism: usize,
    pub request_timeout: Duration,
    pub request_retries: u32,
    pub snapshot_dir: Option<PathBuf>,
    pub upstream_url: Option<String>,
    pub db_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub date: NaiveDate,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ScoutConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let categories = lookup("SCOUT_CATEGORIES")
            .map(|raw| parse_list(&raw))
            .filter(|list| !list.is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect());

        let positions = lookup("SCOUT_POSITIONS")
            .map(|raw| {
                parse_list(&raw)
                    .iter()
                    .filter_map(|code| Position::from_code(code))
                    .collect::<Vec<_>>()
            })
            .filter(|list| !list.is_empty())
            .unwrap_or_else(|| Position::ALL.to_vec());

        let league_size = lookup("SCOUT_LEAGUE_SIZE")
            .and_then(|val| val.trim().parse::<usize>().ok())
            .filter(|n| *n > 0);
        let band_width = lookup("SCOUT_EXTREME_BAND")
            .and_then(|val| val.trim().parse::<u32>().ok())
            .unwrap_or(0);

        Self {
            categories,
            positions,
            extreme_band: band_from_width(band_width, league_size),
            league_size,
            fetch_parallelism: lookup("FETCH_PARALLELISM")
                .and_then(|val| val.trim().parse::<usize>().ok())
                .unwrap_or(4)
                .clamp(1, 16),
            request_timeout: Duration::from_secs(
                lookup("SCOUT_REQUEST_TIMEOUT_SECS")
                    .and_then(|val| val.trim().parse::<u64>().ok())
                    .unwrap_or(10)
                    .clamp(1, 120),
            ),
            request_retries: lookup("SCOUT_REQUEST_RETRIES")
                .and_then(|val| val.trim().parse::<u32>().ok())
                .unwrap_or(2)
                .min(5),
            snapshot_dir: lookup("SCOUT_SNAPSHOT_DIR").and_then(non_empty_path),
            upstream_url: lookup("SCOUT_UPSTREAM_URL")
                .map(|s| s.trim().trim_end_matches('/').to_string())
                .filter(|s| !s.is_empty()),
            db_path: lookup("SCOUT_DB_PATH").and_then(non_empty_path),
            output_dir: lookup("SCOUT_OUTPUT_DIR").and_then(non_empty_path),
            date: Local::now().date_naive(),
        }
    }

    /// Command-line flags win over the environment.
    pub fn apply_args(&mut self, args: &[String]) -> ScoutResult<()> {
        if let Some(raw) = arg_value(args, "--categories") {
            let list = parse_list(&raw);
            if list.is_empty() {
                return Err(ScoutError::Config("--categories is empty".to_string()));
            }
            self.categories = list;
        }
        if let Some(raw) = arg_value(args, "--extreme-band") {
            let width = raw
                .trim()
                .parse::<u32>()
                .map_err(|_| ScoutError::Config(format!("bad --extreme-band value {raw:?}")))?;
            self.extreme_band = band_from_width(width, self.league_size);
        }
        if let Some(raw) = arg_value(args, "--parallelism") {
            let threads = raw
                .trim()
                .parse::<usize>()
                .map_err(|_| ScoutError::Config(format!("bad --parallelism value {raw:?}")))?;
            self.fetch_parallelism = threads.clamp(1, 16);
        }
        if let Some(raw) = arg_value(args, "--date") {
            self.date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map_err(|_| ScoutError::Config(format!("bad --date value {raw:?}, want YYYY-MM-DD")))?;
        }
        if let Some(dir) = arg_value(args, "--snapshot").and_then(non_empty_path) {
            self.snapshot_dir = Some(dir);
            self.upstream_url = None;
        }
        if let Some(url) = arg_value(args, "--upstream") {
            self.upstream_url = Some(url.trim().trim_end_matches('/').to_string());
            self.snapshot_dir = None;
        }
        if let Some(path) = arg_value(args, "--db").and_then(non_empty_path) {
            self.db_path = Some(path);
        }
        if let Some(path) = arg_value(args, "--out").and_then(non_empty_path) {
            self.output_dir = Some(path);
        }
        Ok(())
    }

    pub fn upstream(&self) -> ScoutResult<Upstream> {
        match (&self.snapshot_dir, &self.upstream_url) {
            (Some(dir), None) => Ok(Upstream::Snapshot(dir.clone())),
            (None, Some(url)) => Ok(Upstream::Remote(url.clone())),
            (Some(_), Some(_)) => Err(ScoutError::Config(
                "both a snapshot directory and an upstream url are set".to_string(),
            )),
            (None, None) => Err(ScoutError::Config(
                "set SCOUT_SNAPSHOT_DIR/--snapshot or SCOUT_UPSTREAM_URL/--upstream".to_string(),
            )),
        }
    }

    pub fn resolved_db_path(&self) -> ScoutResult<PathBuf> {
        self.db_path
            .clone()
            .or_else(|| app_cache_dir().map(|dir| dir.join(DB_FILE)))
            .ok_or_else(|| ScoutError::Config("unable to resolve sqlite path".to_string()))
    }
}

fn band_from_width(width: u32, league_size: Option<usize>) -> Option<ExtremeBand> {
    (width > 0).then_some(ExtremeBand { width, league_size })
}

pub fn app_cache_dir() -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(APP_DIR));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(APP_DIR))
}

/// `--flag=value` or `--flag value`.
pub fn arg_value(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            return Some(value.to_string());
        }
        if arg == flag {
            return args.get(idx + 1).cloned();
        }
    }
    None
}

fn parse_list(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in raw.split([',', ';', ' ']) {
        let item = part.trim().to_ascii_uppercase();
        if !item.is_empty() && !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

fn non_empty_path(raw: String) -> Option<PathBuf> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(PathBuf::from(trimmed))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> ScoutConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ScoutConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_track_six_categories_and_five_positions() {
        let cfg = config_from(&[]);
        assert_eq!(cfg.categories, vec!["PTS", "REB", "AST", "3PM", "STL", "BLK"]);
        assert_eq!(cfg.positions.len(), 5);
        assert!(cfg.extreme_band.is_none());
        assert_eq!(cfg.fetch_parallelism, 4);
        assert!(cfg.upstream().is_err());
    }

    #[test]
    fn env_values_are_parsed_and_clamped() {
        let cfg = config_from(&[
            ("SCOUT_CATEGORIES", "pts, reb;pts"),
            ("SCOUT_POSITIONS", "PG,C,G"),
            ("SCOUT_EXTREME_BAND", "5"),
            ("SCOUT_LEAGUE_SIZE", "30"),
            ("FETCH_PARALLELISM", "99"),
            ("SCOUT_UPSTREAM_URL", "http://localhost:8080/"),
        ]);
        assert_eq!(cfg.categories, vec!["PTS", "REB"]);
        assert_eq!(cfg.positions, vec![Position::PointGuard, Position::Center]);
        assert_eq!(
            cfg.extreme_band,
            Some(ExtremeBand {
                width: 5,
                league_size: Some(30)
            })
        );
        assert_eq!(cfg.fetch_parallelism, 16);
        assert_eq!(
            cfg.upstream().unwrap(),
            Upstream::Remote("http://localhost:8080".to_string())
        );
    }

    #[test]
    fn flags_override_environment() {
        let mut cfg = config_from(&[("SCOUT_UPSTREAM_URL", "http://localhost:8080")]);
        let args: Vec<String> = ["--snapshot", "fixtures/day", "--date=2024-11-02", "--extreme-band=0"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        cfg.apply_args(&args).unwrap();
        assert_eq!(cfg.upstream().unwrap(), Upstream::Snapshot(PathBuf::from("fixtures/day")));
        assert_eq!(cfg.date, NaiveDate::from_ymd_opt(2024, 11, 2).unwrap());
        assert!(cfg.extreme_band.is_none());
    }

    #[test]
    fn bad_date_flag_is_a_config_error() {
        let mut cfg = ScoutConfig::default();
        let args = vec!["--date".to_string(), "yesterday".to_string()];
        assert!(matches!(cfg.apply_args(&args), Err(ScoutError::Config(_))));
    }
}
