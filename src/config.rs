use std::env;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base: String,
    pub http_timeout: Duration,
    pub search_rows: usize,
    pub default_k: u32,
    pub radar_top: usize,
    pub fetch_parallelism: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            http_timeout: Duration::from_secs(10),
            search_rows: 10,
            default_k: 10,
            radar_top: 10,
            fetch_parallelism: 4,
        }
    }
}

impl ClientConfig {
    /// Reads `SCOUT_*` variables; `.env` files should already be loaded by the caller.
    pub fn from_env() -> Self {
        let api_base = env::var("SCOUT_API_BASE")
            .ok()
            .map(|val| val.trim().trim_end_matches('/').to_string())
            .filter(|val| !val.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let timeout_secs = env::var("SCOUT_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(10)
            .max(1);
        let search_rows = env::var("SCOUT_SEARCH_ROWS")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(10)
            .clamp(1, 50);
        let default_k = env::var("SCOUT_DEFAULT_K")
            .ok()
            .and_then(|val| val.parse::<u32>().ok())
            .unwrap_or(10)
            .clamp(1, 100);
        let radar_top = env::var("SCOUT_RADAR_TOP")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(10)
            .max(1);
        let fetch_parallelism = env::var("SCOUT_FETCH_PARALLELISM")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(4)
            .clamp(1, 16);

        Self {
            api_base,
            http_timeout: Duration::from_secs(timeout_secs),
            search_rows,
            default_k,
            radar_top,
            fetch_parallelism,
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_and_path() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.endpoint("/api/meta"), "http://127.0.0.1:5000/api/meta");
    }
}
