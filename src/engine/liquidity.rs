//! # engine::liquidity
//!
//! **Liquidity Manager**: proportional deposits and withdrawals with a
//! provider share ledger.
//!
//! Shares are abstract units; a provider's claim on the pool is
//! `shares / total_shares`, so fractions always sum to 1.
//!
//! - Deposit: only the part matching the pool ratio is taken,
//!   `used_a = min(amount_a, amount_b × reserve_a / reserve_b)` and
//!   `used_b = used_a × reserve_b / reserve_a`; the rest is refunded.
//!   `minted = total × used_a / reserve_a`, so the price never moves and a
//!   full withdrawal returns exactly what went in.  An empty ledger takes the
//!   full amounts and mints [`GENESIS_SHARES`].
//! - Withdraw: `burned = shares × pct / 100`, paying out
//!   `reserve × burned / total` of each token.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::engine::pool::ReservePool;
use crate::error::MarketError;

/// Shares minted for the first deposit into an empty ledger.
pub const GENESIS_SHARES: f64 = 1_000_000.0;

/// Ledger entries below this are treated as fully withdrawn.
const DUST_SHARES: f64 = 1e-9;

/// Default cap on distinct providers held in the ledger.
pub const DEFAULT_MAX_PROVIDERS: usize = 1_000;

// ─── Results ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Deposit {
    /// Amounts actually added to the reserves
    pub amount_a:       f64,
    pub amount_b:       f64,
    /// Off-ratio excess handed back to the provider
    pub refunded_a:     f64,
    pub refunded_b:     f64,
    pub shares_minted:  f64,
    /// Provider's share of the pool after the deposit
    pub share_fraction: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Withdrawal {
    pub amount_a:      f64,
    pub amount_b:      f64,
    pub shares_burned: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiquidityPosition {
    pub provider: String,
    pub shares:   f64,
    pub fraction: f64,
}

// ─── Ledger ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct LiquidityLedger {
    shares:        BTreeMap<String, f64>,
    total:         f64,
    max_providers: usize,
}

impl LiquidityLedger {
    /// Empty ledger; the first deposit mints the genesis shares.
    pub fn new(max_providers: usize) -> Self {
        Self {
            shares:        BTreeMap::new(),
            total:         0.0,
            max_providers: max_providers.max(1),
        }
    }

    /// Ledger where `provider` owns the whole genesis pool.
    pub fn with_genesis(provider: &str, max_providers: usize) -> Self {
        let mut ledger = Self::new(max_providers);
        ledger.shares.insert(provider.to_string(), GENESIS_SHARES);
        ledger.total = GENESIS_SHARES;
        ledger
    }

    pub fn total_shares(&self) -> f64 {
        self.total
    }

    pub fn shares_of(&self, provider: &str) -> f64 {
        self.shares.get(provider).copied().unwrap_or(0.0)
    }

    pub fn fraction_of(&self, provider: &str) -> f64 {
        if self.total > 0.0 { self.shares_of(provider) / self.total } else { 0.0 }
    }

    pub fn positions(&self) -> Vec<LiquidityPosition> {
        self.shares
            .iter()
            .map(|(provider, &shares)| LiquidityPosition {
                provider: provider.clone(),
                shares,
                fraction: if self.total > 0.0 { shares / self.total } else { 0.0 },
            })
            .collect()
    }

    /// Deposit the ratio-matching part of both tokens into `pool` and mint
    /// shares for `provider`.
    pub fn add_liquidity(
        &mut self,
        pool: &mut ReservePool,
        provider: &str,
        amount_a: f64,
        amount_b: f64,
    ) -> Result<Deposit, MarketError> {
        for (name, amount) in [("amount_a", amount_a), ("amount_b", amount_b)] {
            if !amount.is_finite() || amount <= 0.0 {
                return Err(MarketError::InvalidAmount(format!(
                    "{name} must be positive, got {amount}"
                )));
            }
        }

        if !self.shares.contains_key(provider) && self.shares.len() >= self.max_providers {
            return Err(MarketError::ProviderLimit(self.max_providers));
        }

        let (used_a, used_b, minted) = if self.total <= 0.0 {
            (amount_a, amount_b, GENESIS_SHARES)
        } else {
            let (reserve_a, reserve_b) = (pool.reserve_a(), pool.reserve_b());
            let used_a = amount_a.min(amount_b * reserve_a / reserve_b);
            let used_b = (used_a * reserve_b / reserve_a).min(amount_b);
            (used_a, used_b, self.total * used_a / reserve_a)
        };

        if !minted.is_finite() || minted <= 0.0 || used_a <= 0.0 || used_b <= 0.0 {
            return Err(MarketError::InvalidAmount("deposit too small to mint shares".into()));
        }

        pool.deposit(used_a, used_b);
        *self.shares.entry(provider.to_string()).or_insert(0.0) += minted;
        self.total += minted;

        Ok(Deposit {
            amount_a:       used_a,
            amount_b:       used_b,
            refunded_a:     amount_a - used_a,
            refunded_b:     amount_b - used_b,
            shares_minted:  minted,
            share_fraction: self.fraction_of(provider),
        })
    }

    /// Withdraw `percentage` of `provider`'s position from `pool`.
    pub fn remove_liquidity(
        &mut self,
        pool: &mut ReservePool,
        provider: &str,
        percentage: f64,
    ) -> Result<Withdrawal, MarketError> {
        if !percentage.is_finite() || percentage <= 0.0 || percentage > 100.0 {
            return Err(MarketError::InvalidPercentage(format!(
                "percentage must be in (0, 100], got {percentage}"
            )));
        }

        let held = self.shares_of(provider);
        if held <= 0.0 {
            return Err(MarketError::NoPosition(provider.to_string()));
        }

        let burned = held * percentage / 100.0;
        if burned >= self.total - DUST_SHARES {
            return Err(MarketError::InsufficientReserve(
                "cannot withdraw the entire pool".into(),
            ));
        }

        let portion = burned / self.total;
        let amount_a = pool.reserve_a() * portion;
        let amount_b = pool.reserve_b() * portion;

        // pool first: on failure the ledger is untouched
        pool.withdraw(amount_a, amount_b)?;

        let remaining = held - burned;
        if remaining <= DUST_SHARES {
            self.shares.remove(provider);
        } else {
            self.shares.insert(provider.to_string(), remaining);
        }
        self.total -= burned;

        Ok(Withdrawal { amount_a, amount_b, shares_burned: burned })
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
