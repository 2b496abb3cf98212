//! # config: dashboard settings from environment variables

use anyhow::Context;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the amm-sim server
    pub market_url:      String,
    /// Refresh cadence of `watch`
    pub poll_interval:   Duration,
    /// Per-request deadline; a poll that overruns is a failed refresh
    pub request_timeout: Duration,
    /// Sent as `X-API-Key` when the server has auth enabled
    pub api_key:         Option<String>,
    /// Closed candles shown under the header
    pub history_rows:    usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let poll_ms: u64 = std::env::var("POLL_INTERVAL_MS")
            .unwrap_or_else(|_| "1000".to_string())
            .parse()
            .context("POLL_INTERVAL_MS must be a number")?;

        let timeout_ms: u64 = std::env::var("REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "2000".to_string())
            .parse()
            .context("REQUEST_TIMEOUT_MS must be a number")?;

        let market_url = std::env::var("MARKET_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            market_url,
            poll_interval:   Duration::from_millis(poll_ms.max(100)),
            request_timeout: Duration::from_millis(timeout_ms.max(100)),
            api_key:         std::env::var("API_KEY").ok().filter(|k| !k.is_empty()),
            history_rows:    std::env::var("HISTORY_ROWS").ok().and_then(|v| v.parse().ok()).unwrap_or(10),
        })
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{path}", self.market_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_api_prefix() {
        let config = Config {
            market_url:      "http://127.0.0.1:3000".into(),
            poll_interval:   Duration::from_secs(1),
            request_timeout: Duration::from_secs(2),
            api_key:         None,
            history_rows:    10,
        };
        assert_eq!(config.endpoint("market_data"), "http://127.0.0.1:3000/api/market_data");
    }
}
