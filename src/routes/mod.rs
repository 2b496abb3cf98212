//! HTTP surface of the market, one module per concern.

pub mod auto_trading;
pub mod liquidity;
pub mod market;
pub mod monitor;
pub mod trade;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::SharedState;

/// All market routes, without middleware.
pub fn router(state: SharedState) -> Router {
    Router::new()
        // ── Market Data ───────────────────────────────────────────────────────
        .route("/api/market_data",       get(market::get_market_data))
        .route("/api/health",            get(market::health_check))
        .route("/api/trades",            get(market::get_trades))
        // ── Trading ───────────────────────────────────────────────────────────
        .route("/api/execute_trade",     post(trade::execute_trade))
        // ── Auto-Trading ──────────────────────────────────────────────────────
        .route("/api/set_target_price",  post(auto_trading::set_target_price))
        .route("/api/stop_auto_trading", post(auto_trading::stop_auto_trading))
        // ── Liquidity ─────────────────────────────────────────────────────────
        .route("/api/add_liquidity",     post(liquidity::add_liquidity))
        .route("/api/remove_liquidity",  post(liquidity::remove_liquidity))
        .route("/api/liquidity",         get(liquidity::get_positions))
        // ── Live Feed ─────────────────────────────────────────────────────────
        .route("/ws/market",             get(monitor::ws_market))
        .with_state(state)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
