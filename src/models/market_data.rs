//! # models::market_data
//!
//! Response body of `GET /api/market_data`, the payload the dashboard polls
//! every second.

use serde::{Deserialize, Serialize};

use crate::engine::candle_builder::Candle;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketData {
    /// Closed candles, oldest first
    pub price_history:   Vec<Candle>,
    /// Candle of the bucket still open, if any
    pub current_candle:  Option<Candle>,
    pub token_a_reserve: f64,
    pub token_b_reserve: f64,
    pub current_price:   f64,
    /// `None` while auto-trading is idle
    pub target_price:    Option<f64>,
    pub auto_trading:    bool,
}
