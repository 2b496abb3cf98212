//! # routes::trade
//!
//! `POST /api/execute_trade`: manual swap against the pool.

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;
use std::sync::atomic::Ordering;

use crate::{
    engine::executor,
    error::AppError,
    events::MarketEvent,
    models::{requests::TradeRequest, TradeSource},
    state::SharedState,
};

pub async fn execute_trade(
    State(state): State<SharedState>,
    Json(req): Json<TradeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let now = state.clock.now();

    // ── Serialized section: quote + apply + record ────────────────────────────
    let (execution, price) = {
        let mut market = state.market.write().await;
        let execution = executor::execute_trade(
            &mut market,
            req.direction,
            req.amount,
            TradeSource::Manual,
            now,
        )?;
        (execution, market.price())
    };

    state.trade_count.fetch_add(1, Ordering::Relaxed);
    if let Some(candle) = execution.closed_candle.clone() {
        state.broadcast(&MarketEvent::CandleClosed { candle });
    }
    state.broadcast(&MarketEvent::TradeExecuted {
        record: Box::new(execution.record.clone()),
    });

    Ok(Json(json!({
        "success":    true,
        "trade_id":   execution.record.trade_id,
        "amount_out": execution.record.amount_out,
        "price":      price,
    })))
}
