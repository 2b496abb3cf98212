//! # error
//!
//! Centralised error types.
//!
//! [`MarketError`] is the engine-level taxonomy: every pool, executor,
//! liquidity and controller operation returns it.  [`AppError`] is what the
//! Axum handlers return; its `IntoResponse` impl converts failures into
//! `{ "success": false, "error": ... }` bodies so the dashboard always gets a
//! machine-readable answer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// ─── Engine Errors ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarketError {
    /// Trade or deposit amount was zero, negative or not a number.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Auto-trading target price must be a positive finite number.
    #[error("Invalid target price: {0}")]
    InvalidTarget(String),

    /// Liquidity removal percentage outside (0, 100].
    #[error("Invalid percentage: {0}")]
    InvalidPercentage(String),

    /// The pool cannot satisfy the request without emptying a reserve.
    #[error("Insufficient reserve: {0}")]
    InsufficientReserve(String),

    /// The provider holds no liquidity shares.
    #[error("No liquidity position for provider '{0}'")]
    NoPosition(String),

    /// The ledger already holds the maximum number of providers.
    #[error("Provider limit of {0} reached")]
    ProviderLimit(usize),

    /// A controller tick failed or timed out. Never surfaced to users.
    #[error("Transient execution failure: {0}")]
    TransientExecutionFailure(String),
}

// ─── HTTP Errors ──────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AppError {
    /// Rejected by the market engine.
    #[error(transparent)]
    Market(#[from] MarketError),

    /// Catch-all for unexpected failures.
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Market(err) => match err {
                MarketError::InvalidAmount(_)
                | MarketError::InvalidTarget(_)
                | MarketError::InvalidPercentage(_) => StatusCode::BAD_REQUEST,
                MarketError::InsufficientReserve(_)
                | MarketError::NoPosition(_)
                | MarketError::ProviderLimit(_) => StatusCode::UNPROCESSABLE_ENTITY,
                MarketError::TransientExecutionFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "success": false,
            "error":   self.to_string(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_bad_request() {
        let err = AppError::from(MarketError::InvalidAmount("0".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = AppError::from(MarketError::InvalidPercentage("150".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn reserve_errors_map_to_unprocessable() {
        let err = AppError::from(MarketError::InsufficientReserve("drain".into()));
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.to_string(), "Insufficient reserve: drain");

        let err = AppError::from(MarketError::ProviderLimit(3));
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn unexpected_failures_map_to_internal() {
        let err = AppError::from(anyhow::anyhow!("boom"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let err = AppError::from(MarketError::TransientExecutionFailure("slow".into()));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
