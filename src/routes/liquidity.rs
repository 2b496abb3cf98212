//! # routes::liquidity
//!
//! | Method | Path                    | Description                         |
//! |--------|-------------------------|-------------------------------------|
//! | POST   | `/api/add_liquidity`    | Deposit both tokens, mint shares    |
//! | POST   | `/api/remove_liquidity` | Withdraw a % of a provider's shares |
//! | GET    | `/api/liquidity`        | Provider share ledger               |
//!
//! Deposits take only the part matching the pool ratio; the excess is
//! reported back as `refunded_a` / `refunded_b`.
//!
//! Requests without `provider` act on the default `"operator"` position,
//! which owns the genesis reserves.

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;
use tracing::info;

use crate::{
    error::AppError,
    events::MarketEvent,
    models::requests::{provider_or_default, AddLiquidityRequest, RemoveLiquidityRequest},
    state::SharedState,
};

/// POST /api/add_liquidity
pub async fn add_liquidity(
    State(state): State<SharedState>,
    Json(req): Json<AddLiquidityRequest>,
) -> Result<impl IntoResponse, AppError> {
    let provider = provider_or_default(req.provider);

    let deposit = state
        .market
        .write()
        .await
        .add_liquidity(&provider, req.amount_a, req.amount_b)?;

    info!(
        provider       = %provider,
        amount_a       = deposit.amount_a,
        amount_b       = deposit.amount_b,
        refunded_a     = deposit.refunded_a,
        refunded_b     = deposit.refunded_b,
        shares_minted  = deposit.shares_minted,
        share_fraction = deposit.share_fraction,
        "💧 Liquidity added"
    );
    state.broadcast(&MarketEvent::LiquidityAdded {
        provider,
        amount_a:       deposit.amount_a,
        amount_b:       deposit.amount_b,
        shares_minted:  deposit.shares_minted,
        share_fraction: deposit.share_fraction,
    });

    Ok(Json(json!({
        "success":        true,
        "amount_a":       deposit.amount_a,
        "amount_b":       deposit.amount_b,
        "refunded_a":     deposit.refunded_a,
        "refunded_b":     deposit.refunded_b,
        "shares_minted":  deposit.shares_minted,
        "share_fraction": deposit.share_fraction,
    })))
}

/// POST /api/remove_liquidity
pub async fn remove_liquidity(
    State(state): State<SharedState>,
    Json(req): Json<RemoveLiquidityRequest>,
) -> Result<impl IntoResponse, AppError> {
    let provider = provider_or_default(req.provider);

    let withdrawal = state
        .market
        .write()
        .await
        .remove_liquidity(&provider, req.percentage)?;

    info!(
        provider      = %provider,
        percentage    = req.percentage,
        amount_a      = withdrawal.amount_a,
        amount_b      = withdrawal.amount_b,
        "💧 Liquidity removed"
    );
    state.broadcast(&MarketEvent::LiquidityRemoved {
        provider,
        amount_a:      withdrawal.amount_a,
        amount_b:      withdrawal.amount_b,
        shares_burned: withdrawal.shares_burned,
    });

    Ok(Json(json!({
        "success":  true,
        "amount_a": withdrawal.amount_a,
        "amount_b": withdrawal.amount_b,
    })))
}

/// GET /api/liquidity
pub async fn get_positions(State(state): State<SharedState>) -> impl IntoResponse {
    let market = state.market.read().await;
    Json(json!({
        "success":      true,
        "total_shares": market.ledger.total_shares(),
        "positions":    market.liquidity_positions(),
    }))
}
