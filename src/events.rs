//! # events
//!
//! Defines [`MarketEvent`], every event pushed to `/ws/market` subscribers.
//!
//! Sent through `tokio::sync::broadcast::Sender<String>` as pre-serialized
//! JSON so subscribers never need the event type to be `Clone`-cheap.

use serde::Serialize;

use crate::engine::candle_builder::Candle;
use crate::models::TradeRecord;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketEvent {
    /// A swap was committed (manual or auto)
    TradeExecuted {
        record: Box<TradeRecord>,
    },

    /// A candle bucket closed and was appended to history
    CandleClosed {
        candle: Candle,
    },

    /// Auto-trading armed or re-targeted
    TargetSet {
        target_price: f64,
    },

    /// Price arrived within tolerance of the target
    TargetReached {
        target_price: f64,
        price:        f64,
        /// `true` when the stop-on-target policy disarmed the controller
        stopped:      bool,
    },

    /// Auto-trading disarmed via `POST /api/stop_auto_trading`
    AutoTradingStopped,

    LiquidityAdded {
        provider:       String,
        amount_a:       f64,
        amount_b:       f64,
        shares_minted:  f64,
        share_fraction: f64,
    },

    LiquidityRemoved {
        provider:      String,
        amount_a:      f64,
        amount_b:      f64,
        shares_burned: f64,
    },
}

impl MarketEvent {
    #[inline]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"event":"SERIALIZATION_ERROR"}"#.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged() {
        let json = MarketEvent::TargetSet { target_price: 1.5 }.to_json();
        assert_eq!(json, r#"{"event":"TARGET_SET","target_price":1.5}"#);
        assert_eq!(MarketEvent::AutoTradingStopped.to_json(), r#"{"event":"AUTO_TRADING_STOPPED"}"#);
    }
}
