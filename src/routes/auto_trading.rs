//! # routes::auto_trading
//!
//! | Method | Path                     | Description                          |
//! |--------|--------------------------|--------------------------------------|
//! | POST   | `/api/set_target_price`  | Arm (or re-target) the auto-trader   |
//! | POST   | `/api/stop_auto_trading` | Disarm; idempotent                   |

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;
use tracing::info;

use crate::{
    error::AppError,
    events::MarketEvent,
    models::requests::TargetPriceRequest,
    state::SharedState,
};

/// POST /api/set_target_price
pub async fn set_target_price(
    State(state): State<SharedState>,
    Json(req): Json<TargetPriceRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.auto_trader.write().await.set_target(req.price)?;

    info!(target_price = req.price, "🎯 Auto-trading target set");
    state.broadcast(&MarketEvent::TargetSet { target_price: req.price });

    Ok(Json(json!({
        "success":      true,
        "target_price": req.price,
    })))
}

/// POST /api/stop_auto_trading
pub async fn stop_auto_trading(State(state): State<SharedState>) -> impl IntoResponse {
    let was_active = state.auto_trader.write().await.stop();

    if was_active {
        info!("⏹️ Auto-trading stopped");
        state.broadcast(&MarketEvent::AutoTradingStopped);
    }

    Json(json!({ "success": true }))
}
