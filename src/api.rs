use std::collections::HashMap;

use anyhow::{Context, Result, anyhow, bail};
use reqwest::blocking::RequestBuilder;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use crate::config::ClientConfig;
use crate::http_client::http_client;
use crate::state::{
    CompareResponse, MetaOptions, PlayerId, PlayerRecord, SearchHit, SimilarQuery,
    SimilarResponse, value_to_display,
};

/// Backend answer once transport and JSON decoding succeeded: either the payload or an
/// `{ "ok": false }` rejection.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    Ok(T),
    Rejected { detail: Option<String> },
}

impl<T> Reply<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Reply::Ok(_))
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Reply::Ok(value) => Some(value),
            Reply::Rejected { .. } => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reply<U> {
        match self {
            Reply::Ok(value) => Reply::Ok(f(value)),
            Reply::Rejected { detail } => Reply::Rejected { detail },
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchPayload {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct PlayerPayload {
    player: PlayerRecord,
}

#[derive(Debug, Deserialize)]
struct DescriptionsPayload {
    #[serde(default)]
    descriptions: Map<String, Value>,
}

/// Splits the `ok` envelope. Missing `ok` counts as success unless the status was an error.
fn parse_envelope<T: DeserializeOwned>(raw: &str, status_ok: bool) -> Result<Reply<T>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("empty response body");
    }
    let root: Value = serde_json::from_str(trimmed).context("invalid api json")?;
    let Value::Object(obj) = &root else {
        bail!("api response is not an object");
    };
    let ok = obj.get("ok").and_then(Value::as_bool).unwrap_or(status_ok);
    if !ok {
        let detail = obj
            .get("detail")
            .or_else(|| obj.get("error"))
            .map(value_to_display)
            .filter(|d| !d.is_empty());
        return Ok(Reply::Rejected { detail });
    }
    let payload = serde_json::from_value(root).context("unexpected api payload")?;
    Ok(Reply::Ok(payload))
}

pub fn parse_meta_json(raw: &str) -> Result<Reply<MetaOptions>> {
    parse_envelope(raw, true)
}

pub fn parse_feature_desc_json(raw: &str) -> Result<Reply<HashMap<String, String>>> {
    let reply: Reply<DescriptionsPayload> = parse_envelope(raw, true)?;
    Ok(reply.map(descriptions_map))
}

fn descriptions_map(payload: DescriptionsPayload) -> HashMap<String, String> {
    payload
        .descriptions
        .iter()
        .map(|(key, value)| (key.clone(), value_to_display(value)))
        .collect()
}

pub fn parse_search_json(raw: &str) -> Result<Reply<Vec<SearchHit>>> {
    let reply: Reply<SearchPayload> = parse_envelope(raw, true)?;
    Ok(reply.map(|payload| payload.results))
}

pub fn parse_player_json(raw: &str) -> Result<Reply<PlayerRecord>> {
    let reply: Reply<PlayerPayload> = parse_envelope(raw, true)?;
    Ok(reply.map(|payload| payload.player))
}

pub fn parse_similar_json(raw: &str) -> Result<Reply<SimilarResponse>> {
    parse_envelope(raw, true)
}

pub fn parse_compare_json(raw: &str) -> Result<Reply<CompareResponse>> {
    parse_envelope(raw, true)
}

/// Sends the request and returns the body with a flag for a 2xx status.
fn send(request: RequestBuilder) -> Result<(String, bool)> {
    let resp = request.send().context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    let looks_json = body.trim_start().starts_with('{');
    if !status.is_success() && !looks_json {
        return Err(anyhow!("http status {}", status.as_u16()));
    }
    Ok((body, status.is_success()))
}

fn get_json<T: DeserializeOwned>(
    cfg: &ClientConfig,
    path: &str,
    query: &[(&str, String)],
) -> Result<Reply<T>> {
    let client = http_client(cfg)?;
    let (body, status_ok) = send(client.get(cfg.endpoint(path)).query(query))?;
    parse_envelope(&body, status_ok)
}

pub fn fetch_meta(cfg: &ClientConfig) -> Result<Reply<MetaOptions>> {
    get_json(cfg, "/api/meta", &[])
}

pub fn fetch_feature_descriptions(cfg: &ClientConfig) -> Result<Reply<HashMap<String, String>>> {
    let reply: Reply<DescriptionsPayload> = get_json(cfg, "/api/feature_desc", &[])?;
    Ok(reply.map(descriptions_map))
}

pub fn search_players(cfg: &ClientConfig, query: &str) -> Result<Reply<Vec<SearchHit>>> {
    let params = [
        ("q", query.to_string()),
        ("rows", cfg.search_rows.to_string()),
    ];
    let reply: Reply<SearchPayload> = get_json(cfg, "/api/search", &params)?;
    Ok(reply.map(|payload| payload.results))
}

pub fn fetch_player(cfg: &ClientConfig, player_id: &str) -> Result<Reply<PlayerRecord>> {
    let params = [("player_id", player_id.to_string())];
    let reply: Reply<PlayerPayload> = get_json(cfg, "/api/player_details", &params)?;
    Ok(reply.map(|payload| payload.player))
}

pub fn fetch_similar(cfg: &ClientConfig, query: &SimilarQuery) -> Result<Reply<SimilarResponse>> {
    get_json(cfg, "/api/similar_players", &query.query_pairs())
}

pub fn compare_players(
    cfg: &ClientConfig,
    player_ids: &[PlayerId],
) -> Result<Reply<CompareResponse>> {
    let client = http_client(cfg)?;
    let body = json!({ "player_ids": player_ids });
    let (raw, status_ok) = send(client.post(cfg.endpoint("/api/compare_players")).json(&body))?;
    parse_envelope(&raw, status_ok)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_carries_detail() {
        let reply = parse_similar_json(r#"{"ok": false, "detail": "player not found"}"#).unwrap();
        assert_eq!(
            reply,
            Reply::Rejected {
                detail: Some("player not found".to_string())
            }
        );
    }

    #[test]
    fn error_status_without_ok_is_rejected() {
        let reply: Reply<MetaOptions> = parse_envelope(r#"{"detail": "bad"}"#, false).unwrap();
        assert!(!reply.is_ok());
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_meta_json("<html>").is_err());
        assert!(parse_meta_json("").is_err());
    }
}
