use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use tracing::{debug, warn};

use crate::config::DEFAULT_HTTP_TIMEOUT_SECS;

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Builds the shared client with `timeout`. Only the first call decides the
/// timeout; later calls return the existing client.
pub fn init_http_client(timeout: Duration) -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        debug!(timeout_secs = timeout.as_secs(), "building http client");
        Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")
    })
}

/// Shared client, built with the default timeout if nothing configured it.
pub fn http_client() -> Result<&'static Client> {
    init_http_client(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))
}

/// GETs `url` and returns the body, failing on any non-success status.
/// Nothing is cached; every call goes to the network.
pub fn fetch_text(client: &Client, url: &str) -> Result<String> {
    let resp = client
        .get(url)
        .header(USER_AGENT, "Mozilla/5.0")
        .header(ACCEPT, "application/json")
        .send()
        .context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        warn!(%url, %status, "non-success response");
        return Err(anyhow!("http {status}"));
    }
    debug!(%url, bytes = body.len(), "fetched");
    Ok(body)
}
