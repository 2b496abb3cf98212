//! # routes::market
//!
//! Read-only endpoints polled by the dashboard.
//!
//! | Method | Path               | Description                                 |
//! |--------|--------------------|---------------------------------------------|
//! | GET    | `/api/market_data` | Candles, reserves, price, auto-trading flag |
//! | GET    | `/api/trades`      | Recent trade log (`?limit=N`, default 50)   |
//! | GET    | `/api/health`      | Counters + controller state                 |

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::Ordering;

use crate::state::SharedState;

const DEFAULT_TRADE_LIMIT: usize = 50;

/// GET /api/market_data
pub async fn get_market_data(State(state): State<SharedState>) -> impl IntoResponse {
    Json(state.market_data().await)
}

#[derive(Debug, Deserialize)]
pub struct TradesQuery {
    pub limit: Option<usize>,
}

/// GET /api/trades, newest last
pub async fn get_trades(
    State(state): State<SharedState>,
    Query(query): Query<TradesQuery>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(DEFAULT_TRADE_LIMIT);
    let records = state.market.read().await.recent_trades(limit);

    Json(json!({
        "success": true,
        "count":   records.len(),
        "records": records,
    }))
}

/// GET /api/health
pub async fn health_check(State(state): State<SharedState>) -> impl IntoResponse {
    let auto = state.auto_trader.read().await.state();

    Json(json!({
        "ok":           true,
        "trade_count":  state.trade_count.load(Ordering::Relaxed),
        "auto_ticks":   state.auto_ticks.load(Ordering::Relaxed),
        "failed_ticks": state.failed_ticks.load(Ordering::Relaxed),
        "auto_trading": auto,
    }))
}
