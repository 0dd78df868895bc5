use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

use crate::config::ClientConfig;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Process-wide client, built from the first config it sees.
pub fn http_client(cfg: &ClientConfig) -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| build_client(cfg))
}

pub fn build_client(cfg: &ClientConfig) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Client::builder()
        .user_agent(concat!("scout_terminal/", env!("CARGO_PKG_VERSION")))
        .default_headers(headers)
        .timeout(cfg.http_timeout)
        .connect_timeout(cfg.http_timeout.min(CONNECT_TIMEOUT))
        .build()
        .with_context(|| format!("failed to build http client for {}", cfg.api_base))
}
