use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;

use crate::http_client::{fetch_text_with_retry, http_client};
use crate::model::{InjuryEntry, Position, RawGame, RawTable};
use crate::sources::{
    DefenseSource, HistoryQuery, InjurySource, LineupSource, SeasonQuery, StatTableSource,
};

/// JSON endpoints of the scrape service:
/// `/lineups`, `/defense?pos=PG`, `/table?q=...`, `/injuries`.
#[derive(Debug, Clone)]
pub struct RemoteSource {
    base_url: String,
    client: &'static Client,
    retries: u32,
}

impl RemoteSource {
    pub fn new(base_url: &str, timeout: Duration, retries: u32) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(anyhow!("empty upstream url"));
        }
        Ok(Self {
            base_url,
            client: http_client(timeout)?,
            retries,
        })
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<Option<T>> {
        let url = format!("{}/{}", self.base_url, path);
        let Some(body) = fetch_text_with_retry(self.client, &url, query, self.retries)? else {
            return Ok(None);
        };
        let parsed = serde_json::from_str(body.trim()).with_context(|| format!("invalid json from {url}"))?;
        Ok(Some(parsed))
    }

    fn get_table(&self, phrase: &str) -> Result<Option<RawTable>> {
        let table: Option<RawTable> = self.get_json("table", &[("q", phrase)])?;
        Ok(table.filter(|t| !t.is_empty()))
    }
}

impl LineupSource for RemoteSource {
    fn fetch_games(&self) -> Result<Vec<RawGame>> {
        self.get_json("lineups", &[])?
            .ok_or_else(|| anyhow!("lineup endpoint returned nothing"))
    }
}

impl DefenseSource for RemoteSource {
    fn fetch_defense_table(&self, position: Position) -> Result<RawTable> {
        self.get_json("defense", &[("pos", position.code())])?
            .ok_or_else(|| anyhow!("no defense table for {position}"))
    }
}

impl StatTableSource for RemoteSource {
    fn fetch_history(&self, query: &HistoryQuery) -> Result<Option<RawTable>> {
        self.get_table(&query.phrase())
    }

    fn fetch_season(&self, query: &SeasonQuery) -> Result<Option<RawTable>> {
        self.get_table(&query.phrase())
    }
}

impl InjurySource for RemoteSource {
    fn fetch_injuries(&self) -> Result<Vec<InjuryEntry>> {
        Ok(self.get_json("injuries", &[])?.unwrap_or_default())
    }
}
