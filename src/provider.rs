use std::collections::HashMap;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use anyhow::Result;

use crate::api::{self, Reply};
use crate::config::ClientConfig;
use crate::state::{
    CompareResponse, Delta, MetaOptions, PlayerRecord, ProviderCommand, SearchHit,
    SimilarResponse,
};

/// Runs backend requests off the UI thread. Each command becomes one job on the fetch pool and
/// reports back through `tx`; the worker exits when the command channel closes.
pub fn spawn_provider(cfg: ClientConfig, tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let pool = build_fetch_pool(cfg.fetch_parallelism);

        while let Ok(cmd) = cmd_rx.recv() {
            let tx = tx.clone();
            let cfg = cfg.clone();
            let job = move || {
                for delta in run_command(&cfg, cmd) {
                    let _ = tx.send(delta);
                }
            };
            if let Some(pool) = pool.as_ref() {
                pool.spawn(job);
            } else {
                thread::spawn(job);
            }
        }
    });
}

fn build_fetch_pool(threads: usize) -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|idx| format!("scout-fetch-{idx}"))
        .build()
        .ok()
}

pub fn run_command(cfg: &ClientConfig, cmd: ProviderCommand) -> Vec<Delta> {
    match cmd {
        ProviderCommand::LoadMeta => meta_deltas(api::fetch_meta(cfg)),
        ProviderCommand::LoadFeatureDescriptions => {
            feature_desc_deltas(api::fetch_feature_descriptions(cfg))
        }
        ProviderCommand::Search { query } => search_deltas(api::search_players(cfg, &query)),
        ProviderCommand::FetchPlayer { player_id } => {
            player_deltas(api::fetch_player(cfg, &player_id))
        }
        ProviderCommand::FetchSimilar(query) => similar_deltas(api::fetch_similar(cfg, &query)),
        ProviderCommand::Compare { player_ids } => {
            compare_deltas(api::compare_players(cfg, &player_ids))
        }
    }
}

// Filter and description loads degrade quietly: the UI still works without them.
pub fn meta_deltas(result: Result<Reply<MetaOptions>>) -> Vec<Delta> {
    match result {
        Ok(Reply::Ok(meta)) => vec![Delta::SetMeta(meta)],
        Ok(Reply::Rejected { detail }) => vec![Delta::Log(warn("Filter options rejected", detail))],
        Err(err) => vec![Delta::Log(format!("[WARN] Filter options error: {err}"))],
    }
}

pub fn feature_desc_deltas(result: Result<Reply<HashMap<String, String>>>) -> Vec<Delta> {
    match result {
        Ok(Reply::Ok(descriptions)) => vec![Delta::SetFeatureDescriptions(descriptions)],
        Ok(Reply::Rejected { detail }) => {
            vec![Delta::Log(warn("Feature descriptions rejected", detail))]
        }
        Err(err) => vec![Delta::Log(format!("[WARN] Feature descriptions error: {err}"))],
    }
}

/// A failed search leaves the current suggestions alone.
pub fn search_deltas(result: Result<Reply<Vec<SearchHit>>>) -> Vec<Delta> {
    match result {
        Ok(Reply::Ok(hits)) => vec![Delta::SetSuggestions(hits)],
        Ok(Reply::Rejected { detail }) => vec![Delta::Log(warn("Search rejected", detail))],
        Err(err) => vec![Delta::Log(format!("[WARN] Search error: {err}"))],
    }
}

pub fn player_deltas(result: Result<Reply<PlayerRecord>>) -> Vec<Delta> {
    match result {
        Ok(Reply::Ok(player)) => vec![Delta::SetPlayerDetail(player)],
        Ok(Reply::Rejected { .. }) => vec![Delta::Alert("Couldn't load player.".to_string())],
        Err(err) => vec![Delta::Alert(err.to_string())],
    }
}

pub fn similar_deltas(result: Result<Reply<SimilarResponse>>) -> Vec<Delta> {
    match result {
        Ok(Reply::Ok(resp)) => vec![Delta::SetSimilar(resp)],
        Ok(Reply::Rejected { detail }) => vec![
            Delta::Log(warn("Similar players rejected", detail)),
            Delta::Alert("Error fetching similar.".to_string()),
        ],
        Err(err) => vec![Delta::Alert(err.to_string())],
    }
}

pub fn compare_deltas(result: Result<Reply<CompareResponse>>) -> Vec<Delta> {
    match result {
        Ok(Reply::Ok(resp)) => vec![Delta::SetCompare(resp)],
        Ok(Reply::Rejected { detail }) => {
            let msg = match detail {
                Some(detail) => format!("Compare failed. {detail}"),
                None => "Compare failed.".to_string(),
            };
            vec![Delta::Alert(msg)]
        }
        Err(err) => vec![Delta::Alert(err.to_string())],
    }
}

fn warn(what: &str, detail: Option<String>) -> String {
    match detail {
        Some(detail) => format!("[WARN] {what}: {detail}"),
        None => format!("[WARN] {what}"),
    }
}
