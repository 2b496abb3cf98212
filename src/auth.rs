//! # auth: API key middleware
//!
//! Guards the market endpoints with an `X-API-Key` header.  The expected key
//! is resolved once from [`crate::config::MarketConfig::api_key`] at startup
//! and handed to the layer as state.
//!
//! ## Mode
//! - no key configured → **allow all** (local simulator default)
//! - key configured → every request must send `X-API-Key: <key>`
//!
//! `/api/health` is always open.

use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

const API_KEY_HEADER: &str = "X-API-Key";
const OPEN_PATHS: &[&str] = &["/api/health"];

/// Expected key shared by every request; `None` disables the check.
#[derive(Debug, Clone, Default)]
pub struct ApiKeyGuard {
    key: Option<Arc<str>>,
}

impl ApiKeyGuard {
    pub fn new(key: Option<String>) -> Self {
        Self { key: key.filter(|k| !k.is_empty()).map(Arc::from) }
    }

    fn admits(&self, request: &Request<Body>) -> bool {
        let Some(expected) = self.key.as_deref() else {
            return true;
        };
        if OPEN_PATHS.contains(&request.uri().path()) {
            return true;
        }
        request
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|provided| provided == expected)
    }
}

/// Axum middleware, installed with `middleware::from_fn_with_state`.
pub async fn require_api_key(
    State(guard): State<ApiKeyGuard>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if guard.admits(&request) {
        return next.run(request).await;
    }

    warn!(path = %request.uri().path(), "❌ Unauthorized request, invalid or missing X-API-Key");
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "success": false,
            "error":   "Unauthorized: invalid or missing X-API-Key header",
        })),
    )
        .into_response()
}
