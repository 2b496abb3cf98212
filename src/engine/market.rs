//! # engine::market
//!
//! [`Market`] owns everything behind the single write lock: the pool, the
//! liquidity ledger, the candle aggregator and the recent trade log.
//! Handlers and the auto-trader take `RwLock<Market>::write()` for every
//! mutation, so two trades can never price against the same stale reserves.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;

use crate::config::MarketConfig;
use crate::engine::candle_builder::{Candle, CandleAggregator, CandleSnapshot};
use crate::engine::liquidity::{Deposit, LiquidityLedger, LiquidityPosition, Withdrawal};
use crate::engine::pool::ReservePool;
use crate::error::MarketError;
use crate::models::requests::DEFAULT_PROVIDER;
use crate::models::TradeRecord;

#[derive(Debug, Clone)]
pub struct Market {
    pub(crate) pool:       ReservePool,
    pub(crate) ledger:     LiquidityLedger,
    pub(crate) candles:    CandleAggregator,
    pub(crate) trades:     VecDeque<TradeRecord>,
    trade_log_limit:       usize,
}

/// Consistent copy of the market taken under one read lock.
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    pub reserve_a: f64,
    pub reserve_b: f64,
    pub price:     f64,
    pub candles:   CandleSnapshot,
}

impl Market {
    pub fn new(config: &MarketConfig) -> Result<Self, MarketError> {
        let pool = ReservePool::new(
            config.initial_reserve_a,
            config.initial_reserve_b,
            config.fee_bps,
        )?;

        Ok(Self {
            pool,
            ledger:          LiquidityLedger::with_genesis(DEFAULT_PROVIDER, config.max_providers),
            candles:         CandleAggregator::new(config.candle_secs, config.history_limit),
            trades:          VecDeque::with_capacity(config.trade_log_limit.min(1024)),
            trade_log_limit: config.trade_log_limit.max(1),
        })
    }

    pub fn pool(&self) -> &ReservePool {
        &self.pool
    }

    pub fn price(&self) -> f64 {
        self.pool.price()
    }

    pub fn snapshot(&self) -> MarketSnapshot {
        MarketSnapshot {
            reserve_a: self.pool.reserve_a(),
            reserve_b: self.pool.reserve_b(),
            price:     self.pool.price(),
            candles:   self.candles.snapshot(),
        }
    }

    /// Most recent trades, newest last.
    pub fn recent_trades(&self, limit: usize) -> Vec<TradeRecord> {
        let skip = self.trades.len().saturating_sub(limit);
        self.trades.iter().skip(skip).cloned().collect()
    }

    pub fn liquidity_positions(&self) -> Vec<LiquidityPosition> {
        self.ledger.positions()
    }

    /// Advance the candle bucket to `at` without trading.
    pub fn roll_candles(&mut self, at: DateTime<Utc>) -> Option<Candle> {
        let price = self.pool.price();
        self.candles.roll(at, price)
    }

    pub(crate) fn push_trade(&mut self, record: TradeRecord) {
        if self.trades.len() >= self.trade_log_limit {
            self.trades.pop_front();
        }
        self.trades.push_back(record);
    }

    pub fn add_liquidity(
        &mut self,
        provider: &str,
        amount_a: f64,
        amount_b: f64,
    ) -> Result<Deposit, MarketError> {
        self.ledger.add_liquidity(&mut self.pool, provider, amount_a, amount_b)
    }

    pub fn remove_liquidity(
        &mut self,
        provider: &str,
        percentage: f64,
    ) -> Result<Withdrawal, MarketError> {
        self.ledger.remove_liquidity(&mut self.pool, provider, percentage)
    }
}
