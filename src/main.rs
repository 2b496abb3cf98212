//! # AMM Sim: Simulated Constant-Product Market
//!
//! ```text
//!  ┌─────────────┐  GET  /api/market_data (1 s poll)  ┌────────────────────────────┐
//!  │  Dashboard  │ ─────────────────────────────────▶ │ AppState                   │
//!  │ (browser or │  POST /api/execute_trade           │ ├─ market (RwLock)         │
//!  │  terminal)  │  POST /api/set_target_price        │ │  ├─ pool  (x·y = k)      │
//!  └─────────────┘  POST /api/stop_auto_trading       │ │  ├─ liquidity ledger     │
//!        ▲          POST /api/add_liquidity           │ │  ├─ candle aggregator    │
//!        │          POST /api/remove_liquidity        │ │  └─ trade log            │
//!        │                                            │ ├─ auto_trader (RwLock)    │
//!        └──── ws://host/ws/market ◀───────────────── │ └─ broadcast_tx            │
//!                                                     └────────────┬───────────────┘
//!                                      auto-trader tick (1 s) ─────┘
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod auth;
mod clock;
mod config;
mod engine;
mod error;
mod events;
mod models;
mod routes;
mod state;

use auth::{require_api_key, ApiKeyGuard};
use clock::SystemClock;
use config::MarketConfig;
use engine::auto_trader::run_auto_trader;
use state::build_state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Load .env ──────────────────────────────────────────────────────────
    dotenvy::dotenv().ok();

    // ── 2. Structured logging ─────────────────────────────────────────────────
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("amm_sim=debug".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!(r#"

  ╔═══════════════════════════════════════════════════════╗
  ║           AMM SIM · Constant-Product Market           ║
  ║  Pool · Executor · Liquidity · Candles · Auto-Trader  ║
  ╚═══════════════════════════════════════════════════════╝"#);

    // ── 3. Shared state ───────────────────────────────────────────────────────
    let config = MarketConfig::from_env();
    info!(
        reserve_a   = config.initial_reserve_a,
        reserve_b   = config.initial_reserve_b,
        fee_bps     = config.fee_bps,
        candle_secs = config.candle_secs,
        "Market config loaded"
    );
    let api_guard = ApiKeyGuard::new(config.api_key.clone());
    let state = build_state(config, Arc::new(SystemClock))?;

    // ── 4. Shutdown signal ────────────────────────────────────────────────────
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("🛑 Ctrl-C received, shutting down");
        }
        let _ = shutdown_tx.send(true);
    });

    // ── 5. Auto-trader loop ───────────────────────────────────────────────────
    let auto_handle = tokio::spawn(run_auto_trader(state.clone(), shutdown_rx.clone()));

    // ── 6. CORS ───────────────────────────────────────────────────────────────
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // ── 7. Router ─────────────────────────────────────────────────────────────
    let app = routes::router(state)
        .layer(axum::middleware::from_fn_with_state(api_guard, require_api_key))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // ── 8. Bind & Serve ───────────────────────────────────────────────────────
    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    info!(?addr, "🚀 AMM Sim server starting");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let mut server_shutdown = shutdown_rx;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = server_shutdown.changed().await;
        })
        .await?;

    auto_handle.await?;
    info!("👋 AMM Sim stopped");

    Ok(())
}
