use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use once_cell::sync::OnceCell;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;

const RETRY_BACKOFF_MS: u64 = 500;

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared client; the first caller's timeout applies for the process.
pub fn http_client(timeout: Duration) -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")
    })
}

/// GET with bounded retries. A 404 or an empty/`null` body is "no data",
/// returned as `Ok(None)`; anything else that keeps failing is an error.
pub fn fetch_text_with_retry(
    client: &Client,
    url: &str,
    query: &[(&str, &str)],
    retries: u32,
) -> Result<Option<String>> {
    let mut attempt = 0u32;
    loop {
        match fetch_text(client, url, query) {
            Ok(body) => return Ok(body),
            Err(err) if attempt < retries => {
                attempt += 1;
                tracing::warn!(url, attempt, error = %err, "request failed, retrying");
                thread::sleep(Duration::from_millis(RETRY_BACKOFF_MS * u64::from(attempt)));
            }
            Err(err) => return Err(err.context(format!("giving up on {url} after {} attempts", attempt + 1))),
        }
    }
}

fn fetch_text(client: &Client, url: &str, query: &[(&str, &str)]) -> Result<Option<String>> {
    let resp = client
        .get(url)
        .query(query)
        .header(USER_AGENT, "Mozilla/5.0")
        .send()
        .context("request failed")?;
    let status = resp.status();
    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow!("http {}: {}", status, body));
    }
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    Ok(Some(body))
}
