//! # models::trade
//!
//! Defines [`Direction`] and [`TradeRecord`], the immutable log entry the
//! Trade Executor writes for every swap and feeds into the candle aggregator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Direction ────────────────────────────────────────────────────────────────

/// Which token goes into the pool.
///
/// `AtoB` sells token A for token B and pushes the price (`B / A`) down.
/// `BtoA` sells token B for token A and pushes the price up.
///
/// `"buy"` / `"sell"` are accepted as aliases for older dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "AtoB", alias = "sell", alias = "SELL")]
    AtoB,
    #[serde(rename = "BtoA", alias = "buy", alias = "BUY")]
    BtoA,
}

impl Direction {
    /// The direction that moves price up when `towards_higher` is true.
    #[inline]
    pub fn raising_price(towards_higher: bool) -> Self {
        if towards_higher { Direction::BtoA } else { Direction::AtoB }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::AtoB => write!(f, "AtoB"),
            Direction::BtoA => write!(f, "BtoA"),
        }
    }
}

// ─── TradeSource ──────────────────────────────────────────────────────────────

/// Who issued the trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeSource {
    /// `POST /api/execute_trade`
    Manual,
    /// Auto-Trading Controller tick
    Auto,
}

// ─── TradeRecord ──────────────────────────────────────────────────────────────

/// One executed swap. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub trade_id:    Uuid,
    pub direction:   Direction,
    pub amount_in:   f64,
    pub amount_out:  f64,
    /// Part of `amount_in` kept by the pool as fee
    pub fee:         f64,
    /// Pool price (`reserve_b / reserve_a`) right after the swap
    pub price_after: f64,
    pub source:      TradeSource,
    pub executed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_accepts_legacy_aliases() {
        let buy: Direction = serde_json::from_str(r#""buy""#).unwrap();
        let sell: Direction = serde_json::from_str(r#""sell""#).unwrap();
        assert_eq!(buy, Direction::BtoA);
        assert_eq!(sell, Direction::AtoB);
    }

    #[test]
    fn direction_serializes_canonical_names() {
        assert_eq!(serde_json::to_string(&Direction::AtoB).unwrap(), r#""AtoB""#);
        assert_eq!(serde_json::to_string(&Direction::BtoA).unwrap(), r#""BtoA""#);
    }
}
