//! # engine::auto_trader
//!
//! **Auto-Trading Controller**: steers the pool price toward an operator
//! target by issuing bounded trades on a fixed cadence.
//!
//! ## State machine
//! ```text
//!            set_target_price(p > 0)
//!   ┌──────┐ ───────────────────────▶ ┌──────────────────┐
//!   │ Idle │                          │ Active { target } │ ◀─┐ set_target_price(p')
//!   └──────┘ ◀─────────────────────── └──────────────────┘ ──┘ (overwrite in place)
//!            stop_auto_trading()
//!            or target reached when AUTO_STOP_ON_TARGET=true
//! ```
//!
//! ## One tick
//! ```text
//! 1. roll candle bucket (even when idle)
//! 2. plan: |price − target| / target ≤ tolerance → Reached
//!          price < target → BtoA, price > target → AtoB
//!          size = exact input landing on target, capped at max_step × reserve_in
//! 3. execute through the Trade Executor (never touches reserves directly)
//! ```
//! The runner wraps each tick in a timeout.  A failed or stalled tick is
//! logged and the loop carries on with the next one.

use serde::Serialize;
use std::sync::atomic::Ordering;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::AutoTradingConfig;
use crate::engine::executor::{execute_trade, Execution};
use crate::engine::pool::ReservePool;
use crate::error::MarketError;
use crate::events::MarketEvent;
use crate::models::{Direction, TradeSource};
use crate::state::SharedState;

// ─── State ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutoTradingState {
    Idle,
    Active { target_price: f64 },
}

/// What the next tick should do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickPlan {
    Idle,
    Reached { target_price: f64, price: f64 },
    Trade { direction: Direction, amount: f64 },
}

/// Outcome of one controller tick.
#[derive(Debug, Clone)]
pub enum TickOutcome {
    Idle,
    Reached { stopped: bool },
    Traded(Box<Execution>),
}

// ─── Controller ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AutoTrader {
    state:     AutoTradingState,
    config:    AutoTradingConfig,
    /// Set once `Reached` has been reported for the current target,
    /// cleared by the next trade or a new target.
    at_target: bool,
}

impl AutoTrader {
    pub fn new(config: AutoTradingConfig) -> Self {
        Self {
            state: AutoTradingState::Idle,
            config,
            at_target: false,
        }
    }

    pub fn state(&self) -> AutoTradingState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, AutoTradingState::Active { .. })
    }

    pub fn target(&self) -> Option<f64> {
        match self.state {
            AutoTradingState::Active { target_price } => Some(target_price),
            AutoTradingState::Idle => None,
        }
    }

    /// `Idle → Active`, or overwrite the target when already active.
    pub fn set_target(&mut self, price: f64) -> Result<(), MarketError> {
        if !price.is_finite() || price <= 0.0 {
            return Err(MarketError::InvalidTarget(format!(
                "target price must be positive, got {price}"
            )));
        }
        self.state = AutoTradingState::Active { target_price: price };
        self.at_target = false;
        Ok(())
    }

    /// `Active → Idle`. Returns whether the controller was active.
    pub fn stop(&mut self) -> bool {
        let was_active = self.is_active();
        self.state = AutoTradingState::Idle;
        self.at_target = false;
        was_active
    }

    /// Decide the next move against the current pool.
    pub fn plan(&self, pool: &ReservePool) -> TickPlan {
        let AutoTradingState::Active { target_price } = self.state else {
            return TickPlan::Idle;
        };

        let price = pool.price();
        let gap = (price - target_price).abs() / target_price;
        if gap <= self.config.tolerance {
            return TickPlan::Reached { target_price, price };
        }

        let direction = Direction::raising_price(price < target_price);
        let (reserve_in, _) = pool.reserves_for(direction);

        // in-side reserve × post-trade in-side reserve must equal k·T (B in)
        // or k/T (A in); see `input_to_reach`.
        let settle = match direction {
            Direction::BtoA => pool.k() * target_price,
            Direction::AtoB => pool.k() / target_price,
        };
        let exact = input_to_reach(reserve_in, settle, pool.fee_fraction());
        let cap = reserve_in * self.config.max_step_fraction;
        let amount = exact.min(cap);

        if !amount.is_finite() || amount <= 0.0 {
            return TickPlan::Reached { target_price, price };
        }

        TickPlan::Trade { direction, amount }
    }

    /// Record arrival at `target_price`. Returns `(first_arrival, stopped)`,
    /// or `None` when the target was replaced after the plan was made.
    fn mark_reached(&mut self, target_price: f64) -> Option<(bool, bool)> {
        if self.target() != Some(target_price) {
            return None;
        }
        let first = !self.at_target;
        self.at_target = true;
        if self.config.stop_on_target {
            self.stop();
            return Some((first, true));
        }
        Some((first, false))
    }

    fn mark_moved(&mut self) {
        self.at_target = false;
    }
}

/// Gross input `g` such that a constant-product swap lands exactly on the
/// target: `(r + g)(r + g(1 − f)) = settle`.
///
/// Positive root of `(1−f)g² + r(2−f)g + r² − settle = 0`.
fn input_to_reach(reserve_in: f64, settle: f64, fee: f64) -> f64 {
    let keep = 1.0 - fee;
    let disc = reserve_in * reserve_in * fee * fee + 4.0 * keep * settle;
    (-reserve_in * (2.0 - fee) + disc.sqrt()) / (2.0 * keep)
}

// ─── Tick ─────────────────────────────────────────────────────────────────────

/// Run one controller step against the shared market.
pub async fn auto_trade_tick(state: &SharedState) -> Result<TickOutcome, MarketError> {
    let now = state.clock.now();
    let mut market = state.market.write().await;

    // ── 1. Candle bucket roll ─────────────────────────────────────────────────
    if let Some(candle) = market.roll_candles(now) {
        state.broadcast(&MarketEvent::CandleClosed { candle });
    }

    // ── 2. Plan ───────────────────────────────────────────────────────────────
    // One controller guard covers plan and mark, so a concurrent
    // set_target_price lands either before the plan or after the tick.
    let mut trader = state.auto_trader.write().await;
    let plan = trader.plan(market.pool());

    match plan {
        TickPlan::Idle => Ok(TickOutcome::Idle),

        TickPlan::Reached { target_price, price } => {
            let Some((first, stopped)) = trader.mark_reached(target_price) else {
                return Ok(TickOutcome::Idle);
            };
            drop(trader);
            if first {
                info!(target_price, price, stopped, "🎯 [AUTO] Target price reached");
                state.broadcast(&MarketEvent::TargetReached { target_price, price, stopped });
            }
            Ok(TickOutcome::Reached { stopped })
        }

        // ── 3. Execute through the Trade Executor ─────────────────────────────
        TickPlan::Trade { direction, amount } => {
            debug!(%direction, amount, price = market.price(), "[AUTO] Nudging price");
            let execution = execute_trade(&mut market, direction, amount, TradeSource::Auto, now)?;
            trader.mark_moved();
            drop(trader);
            drop(market);

            state.trade_count.fetch_add(1, Ordering::Relaxed);
            if let Some(candle) = execution.closed_candle.clone() {
                state.broadcast(&MarketEvent::CandleClosed { candle });
            }
            state.broadcast(&MarketEvent::TradeExecuted {
                record: Box::new(execution.record.clone()),
            });

            Ok(TickOutcome::Traded(Box::new(execution)))
        }
    }
}

// ─── Runner ───────────────────────────────────────────────────────────────────

/// Background loop: one [`auto_trade_tick`] per interval until `shutdown`
/// flips (or its sender is dropped).
pub async fn run_auto_trader(state: SharedState, mut shutdown: watch::Receiver<bool>) {
    let auto = state.config.auto.clone();
    let mut interval = tokio::time::interval(auto.tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        tick_ms    = auto.tick_interval.as_millis() as u64,
        timeout_ms = auto.tick_timeout.as_millis() as u64,
        "🤖 Auto-trader loop started"
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = shutdown.changed() => break,
        }

        state.auto_ticks.fetch_add(1, Ordering::Relaxed);

        let failure = match tokio::time::timeout(auto.tick_timeout, auto_trade_tick(&state)).await {
            Ok(Ok(TickOutcome::Idle)) => None,
            Ok(Ok(TickOutcome::Reached { stopped })) => {
                debug!(stopped, "[AUTO] Holding at target");
                None
            }
            Ok(Ok(TickOutcome::Traded(execution))) => {
                debug!(
                    trade_id    = %execution.record.trade_id,
                    price_after = execution.record.price_after,
                    "[AUTO] Tick traded"
                );
                None
            }
            Ok(Err(e)) => Some(MarketError::TransientExecutionFailure(e.to_string())),
            Err(_) => Some(MarketError::TransientExecutionFailure(format!(
                "tick exceeded {}ms",
                auto.tick_timeout.as_millis()
            ))),
        };

        if let Some(err) = failure {
            state.failed_ticks.fetch_add(1, Ordering::Relaxed);
            warn!(error = %err, "⚠️ [AUTO] Tick failed, retrying next interval");
        }
    }

    info!("🤖 Auto-trader loop stopped");
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::MarketConfig;
    use crate::state::build_state;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;
    use std::time::Duration;

    fn trader(stop_on_target: bool) -> AutoTrader {
        AutoTrader::new(AutoTradingConfig { stop_on_target, ..AutoTradingConfig::default() })
    }

    fn test_state(config: MarketConfig) -> (SharedState, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc.timestamp_opt(1_000_000, 0).unwrap()));
        let state = build_state(config, clock.clone()).unwrap();
        (state, clock)
    }

    #[test]
    fn negative_target_is_rejected_and_stays_idle() {
        let mut t = trader(false);
        assert!(matches!(t.set_target(-1.0), Err(MarketError::InvalidTarget(_))));
        assert!(matches!(t.set_target(0.0), Err(MarketError::InvalidTarget(_))));
        assert!(!t.is_active());
        assert_eq!(t.target(), None);
    }

    #[test]
    fn set_target_overwrites_in_place() {
        let mut t = trader(false);
        t.set_target(1.2).unwrap();
        t.set_target(0.8).unwrap();
        assert_eq!(t.state(), AutoTradingState::Active { target_price: 0.8 });
        assert!(t.stop());
        assert!(!t.stop());
        assert_eq!(t.state(), AutoTradingState::Idle);
    }

    #[test]
    fn plan_direction_follows_target() {
        let pool = ReservePool::new(1000.0, 1000.0, 0).unwrap();
        let mut t = trader(false);
        assert_eq!(t.plan(&pool), TickPlan::Idle);

        t.set_target(1.5).unwrap();
        assert!(matches!(t.plan(&pool), TickPlan::Trade { direction: Direction::BtoA, .. }));

        t.set_target(0.5).unwrap();
        assert!(matches!(t.plan(&pool), TickPlan::Trade { direction: Direction::AtoB, .. }));

        t.set_target(1.00001).unwrap();
        assert!(matches!(t.plan(&pool), TickPlan::Reached { .. }));
    }

    #[test]
    fn step_is_capped_by_max_fraction() {
        let pool = ReservePool::new(1000.0, 1000.0, 0).unwrap();
        let mut t = trader(false);
        t.set_target(4.0).unwrap();
        let TickPlan::Trade { amount, .. } = t.plan(&pool) else {
            panic!("expected a trade");
        };
        assert!((amount - 10.0).abs() < 1e-9);
    }

    #[test]
    fn exact_step_lands_on_target_without_overshoot() {
        for fee_bps in [0u32, 30, 300] {
            for target in [1.004, 0.996] {
                let mut pool = ReservePool::new(1000.0, 1000.0, fee_bps).unwrap();
                let mut t = trader(false);
                t.set_target(target).unwrap();

                let TickPlan::Trade { direction, amount } = t.plan(&pool) else {
                    panic!("expected a trade");
                };
                let q = pool.quote(direction, amount).unwrap();
                pool.apply(&q).unwrap();
                assert!((pool.price() - target).abs() < 1e-9, "fee {fee_bps}: {}", pool.price());
            }
        }
    }

    #[test]
    fn stop_on_target_policy_disarms() {
        let pool = ReservePool::new(1000.0, 1000.0, 0).unwrap();
        let mut t = trader(true);
        t.set_target(1.0).unwrap();
        assert!(matches!(t.plan(&pool), TickPlan::Reached { .. }));
        assert_eq!(t.mark_reached(1.0), Some((true, true)));
        assert!(!t.is_active());
    }

    #[test]
    fn reached_reported_once_per_arrival() {
        let mut t = trader(false);
        t.set_target(1.0).unwrap();
        assert_eq!(t.mark_reached(1.0), Some((true, false)));
        assert_eq!(t.mark_reached(1.0), Some((false, false)));
        t.mark_moved();
        assert_eq!(t.mark_reached(1.0), Some((true, false)));
        assert!(t.is_active());
    }

    #[test]
    fn retarget_after_plan_is_not_stopped() {
        let pool = ReservePool::new(1000.0, 1000.0, 0).unwrap();
        let mut t = trader(true);
        t.set_target(1.0).unwrap();
        let TickPlan::Reached { target_price, .. } = t.plan(&pool) else {
            panic!("expected target reached");
        };

        t.set_target(2.0).unwrap();
        assert_eq!(t.mark_reached(target_price), None);
        assert_eq!(t.state(), AutoTradingState::Active { target_price: 2.0 });
    }

    #[tokio::test]
    async fn retarget_queued_behind_tick_is_kept() {
        let config = MarketConfig {
            initial_reserve_a: 1000.0,
            initial_reserve_b: 1000.0,
            auto: AutoTradingConfig { stop_on_target: true, ..AutoTradingConfig::default() },
            ..MarketConfig::default()
        };
        let (state, _clock) = test_state(config);
        state.auto_trader.write().await.set_target(1.0).unwrap();

        // hold the controller so the tick queues first and the retarget second
        let held = state.auto_trader.write().await;
        let tick = tokio::spawn({
            let state = state.clone();
            async move { auto_trade_tick(&state).await }
        });
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        let retarget = tokio::spawn({
            let state = state.clone();
            async move { state.auto_trader.write().await.set_target(2.0) }
        });
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        drop(held);

        let outcome = tick.await.unwrap().unwrap();
        assert!(matches!(outcome, TickOutcome::Reached { stopped: true }));
        retarget.await.unwrap().unwrap();

        let trader = state.auto_trader.read().await;
        assert_eq!(trader.state(), AutoTradingState::Active { target_price: 2.0 });
    }

    #[tokio::test]
    async fn ticks_converge_toward_target() {
        let (state, clock) = test_state(MarketConfig::default());
        state.auto_trader.write().await.set_target(1.05).unwrap();

        let mut last = state.market.read().await.price();
        for _ in 0..20 {
            clock.advance(chrono::Duration::seconds(1));
            auto_trade_tick(&state).await.unwrap();
            let price = state.market.read().await.price();
            assert!(price >= last);
            assert!(price <= 1.05 * (1.0 + 1e-9));
            last = price;
        }

        assert!((last - 1.05).abs() / 1.05 <= 1e-4);
        let outcome = auto_trade_tick(&state).await.unwrap();
        assert!(matches!(outcome, TickOutcome::Reached { stopped: false }));
        assert!(state.auto_trader.read().await.is_active());

        let trades = state.market.read().await.recent_trades(100);
        assert!(trades.iter().all(|r| r.source == TradeSource::Auto));
    }

    #[tokio::test]
    async fn idle_tick_still_rolls_candles() {
        let (state, clock) = test_state(MarketConfig::default());
        assert!(matches!(auto_trade_tick(&state).await.unwrap(), TickOutcome::Idle));
        clock.advance(chrono::Duration::seconds(120));
        auto_trade_tick(&state).await.unwrap();

        let data = state.market_data().await;
        assert_eq!(data.price_history.len(), 1);
        assert!(data.current_candle.is_some());
        assert!(!data.auto_trading);
        assert_eq!(data.target_price, None);
    }

    #[tokio::test(start_paused = true)]
    async fn runner_survives_stalled_ticks() {
        let config = MarketConfig {
            auto: AutoTradingConfig {
                tick_interval: Duration::from_millis(1000),
                tick_timeout:  Duration::from_millis(500),
                ..AutoTradingConfig::default()
            },
            ..MarketConfig::default()
        };
        let (state, _clock) = test_state(config);
        state.auto_trader.write().await.set_target(1.05).unwrap();

        let (tx, rx) = watch::channel(false);
        let stall = state.market.write().await;
        let handle = tokio::spawn(run_auto_trader(state.clone(), rx));

        tokio::time::sleep(Duration::from_millis(1600)).await;
        assert!(state.failed_ticks.load(Ordering::Relaxed) >= 1);
        drop(stall);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(state.market.read().await.price() > 1.0);

        tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
