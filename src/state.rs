//! # state
//!
//! AppState: the owned market instance plus everything the handlers and the
//! auto-trader share.  Nothing here is a global; `main` builds one state and
//! injects it into the router and the background runner.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use crate::clock::Clock;
use crate::config::MarketConfig;
use crate::engine::auto_trader::AutoTrader;
use crate::engine::market::Market;
use crate::error::MarketError;
use crate::events::MarketEvent;
use crate::models::MarketData;

// ─── AppState ─────────────────────────────────────────────────────────────────

/// Top-level shared state injected into every Axum handler.
pub struct AppState {
    // ── Market ────────────────────────────────────────────────────────────────
    /// Single serialization point for every pool mutation.
    /// Tokio's RwLock is fair, so writers are served in arrival order.
    pub market: RwLock<Market>,

    // ── Auto-Trading ──────────────────────────────────────────────────────────
    /// Lock order: always `market` before `auto_trader` when both are held.
    pub auto_trader: RwLock<AutoTrader>,

    // ── Monitor / WebSocket ───────────────────────────────────────────────────
    pub broadcast_tx: broadcast::Sender<String>,

    // ── Infrastructure ────────────────────────────────────────────────────────
    pub clock:  Arc<dyn Clock>,
    pub config: Arc<MarketConfig>,

    // ── Metrics ───────────────────────────────────────────────────────────────
    pub trade_count:  AtomicU64,
    pub auto_ticks:   AtomicU64,
    pub failed_ticks: AtomicU64,
}

impl AppState {
    pub fn new(config: MarketConfig, clock: Arc<dyn Clock>) -> Result<Self, MarketError> {
        let (broadcast_tx, _) = broadcast::channel(256);
        let market = Market::new(&config)?;

        Ok(Self {
            market:       RwLock::new(market),
            auto_trader:  RwLock::new(AutoTrader::new(config.auto.clone())),
            broadcast_tx,
            clock,
            config:       Arc::new(config),
            trade_count:  AtomicU64::new(0),
            auto_ticks:   AtomicU64::new(0),
            failed_ticks: AtomicU64::new(0),
        })
    }

    // ── Helper Methods ────────────────────────────────────────────────────────

    /// Broadcast to every WebSocket subscriber.
    /// A send error only means nobody is listening.
    pub fn broadcast(&self, event: &MarketEvent) {
        let _ = self.broadcast_tx.send(event.to_json());
    }

    /// Build the `GET /api/market_data` payload.
    ///
    /// Reserves, price and candles come from one read lock; the auto-trading
    /// fields are read right after, without holding the market lock.
    pub async fn market_data(&self) -> MarketData {
        let snapshot = self.market.read().await.snapshot();
        let (target_price, auto_trading) = {
            let trader = self.auto_trader.read().await;
            (trader.target(), trader.is_active())
        };

        MarketData {
            price_history:   snapshot.candles.price_history,
            current_candle:  snapshot.candles.current_candle,
            token_a_reserve: snapshot.reserve_a,
            token_b_reserve: snapshot.reserve_b,
            current_price:   snapshot.price,
            target_price,
            auto_trading,
        }
    }
}

/// Convenience type alias
pub type SharedState = Arc<AppState>;

pub fn build_state(config: MarketConfig, clock: Arc<dyn Clock>) -> Result<SharedState, MarketError> {
    Ok(Arc::new(AppState::new(config, clock)?))
}
