//! # engine::executor
//!
//! **Trade Executor**: the only code path that swaps against the pool.
//! Manual trades from `POST /api/execute_trade` and auto-trader ticks both
//! end up here, always while holding the market write lock.
//!
//! ## Order of operations
//! ```text
//! 1. validate amount          → InvalidAmount (reserves untouched)
//! 2. quote against the pool   → InsufficientReserve (reserves untouched)
//! 3. apply quote              → both reserves move together
//! 4. append TradeRecord       → bounded trade log
//! 5. feed the aggregator      → candle high/low/close/volume
//! ```

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::engine::candle_builder::Candle;
use crate::engine::market::Market;
use crate::error::MarketError;
use crate::models::{Direction, TradeRecord, TradeSource};

/// Result of a committed swap.
#[derive(Debug, Clone)]
pub struct Execution {
    pub record: TradeRecord,
    /// Candle closed because this trade opened a new bucket
    pub closed_candle: Option<Candle>,
}

pub fn execute_trade(
    market: &mut Market,
    direction: Direction,
    amount: f64,
    source: TradeSource,
    at: DateTime<Utc>,
) -> Result<Execution, MarketError> {
    // ── 1. Validate ───────────────────────────────────────────────────────────
    if !amount.is_finite() || amount <= 0.0 {
        debug!(amount, %direction, "Trade rejected, amount must be positive");
        return Err(MarketError::InvalidAmount(format!(
            "trade amount must be positive, got {amount}"
        )));
    }

    // ── 2. Quote + apply ──────────────────────────────────────────────────────
    let price_before = market.pool.price();
    let quote = market.pool.quote(direction, amount)?;
    market.pool.apply(&quote)?;
    let price_after = market.pool.price();

    // ── 3. Record ─────────────────────────────────────────────────────────────
    let record = TradeRecord {
        trade_id:    Uuid::new_v4(),
        direction,
        amount_in:   quote.amount_in,
        amount_out:  quote.amount_out,
        fee:         quote.fee,
        price_after,
        source,
        executed_at: at,
    };
    market.push_trade(record.clone());

    // ── 4. Candle ─────────────────────────────────────────────────────────────
    let closed_candle = market.candles.record(at, price_before, price_after, quote.amount_in);

    info!(
        trade_id   = %record.trade_id,
        direction  = %direction,
        source     = ?source,
        amount_in  = quote.amount_in,
        amount_out = quote.amount_out,
        price_before,
        price_after,
        "💱 [EXECUTOR] Trade executed"
    );

    Ok(Execution { record, closed_candle })
}

// ─── Tests ────────────────────────────────────────────────────────────────────
