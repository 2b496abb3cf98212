//! # market: read side of the dashboard
//!
//! Mirrors the `GET /api/market_data` body. The dashboard keeps nothing
//! beyond the latest poll; every refresh replaces the previous value.

use anyhow::Context;
use serde::Deserialize;

use crate::config::Config;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Candle {
    pub time:   i64,
    pub open:   f64,
    pub high:   f64,
    pub low:    f64,
    pub close:  f64,
    #[serde(default)]
    pub volume: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarketData {
    #[serde(default)]
    pub price_history:   Vec<Candle>,
    pub current_candle:  Option<Candle>,
    pub token_a_reserve: f64,
    pub token_b_reserve: f64,
    pub current_price:   f64,
    pub target_price:    Option<f64>,
    pub auto_trading:    bool,
}

impl MarketData {
    /// Closed candles followed by the open one, oldest first.
    pub fn series(&self) -> impl Iterator<Item = &Candle> {
        self.price_history.iter().chain(self.current_candle.iter())
    }
}

pub async fn fetch_market_data(
    client: &reqwest::Client,
    config: &Config,
) -> anyhow::Result<MarketData> {
    let mut req = client
        .get(config.endpoint("market_data"))
        .timeout(config.request_timeout);
    if let Some(key) = &config.api_key {
        req = req.header("X-API-Key", key);
    }

    let resp = req
        .send()
        .await
        .context("Market server unreachable")?
        .error_for_status()
        .context("Market server returned an error")?;

    resp.json().await.context("Failed to parse market_data response")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_server_body() {
        let body = r#"{
            "price_history": [{"time":0,"open":1.0,"high":1.2,"low":0.9,"close":1.1,"volume":4.0}],
            "current_candle": {"time":60,"open":1.1,"high":1.1,"low":1.1,"close":1.1,"volume":0.0},
            "token_a_reserve": 1000.0,
            "token_b_reserve": 1100.0,
            "current_price": 1.1,
            "target_price": null,
            "auto_trading": false
        }"#;
        let data: MarketData = serde_json::from_str(body).unwrap();
        assert_eq!(data.series().count(), 2);
        assert_eq!(data.target_price, None);
        assert!(!data.auto_trading);
    }

    #[test]
    fn tolerates_empty_history() {
        let body = r#"{"current_candle":null,"token_a_reserve":1.0,"token_b_reserve":1.0,
                       "current_price":1.0,"target_price":2.0,"auto_trading":true}"#;
        let data: MarketData = serde_json::from_str(body).unwrap();
        assert_eq!(data.series().count(), 0);
        assert_eq!(data.target_price, Some(2.0));
    }
}
