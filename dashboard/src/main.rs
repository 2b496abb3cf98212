//! # AMM Dashboard: terminal client for the market server
//!
//! ## Flow
//! ```text
//! watch (default):
//!   loop every POLL_INTERVAL_MS until Ctrl-C:
//!     1. GET /api/market_data
//!     2. render reserves · price · target · status · recent candles
//!
//! one-shot (trade / target / stop / add / remove):
//!   1. validate input locally (no request on bad input)
//!   2. POST once, no retry
//! ```

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod market;
mod poster;
mod render;

use commands::Command;
use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env()
            .add_directive("amm_dashboard=info".parse()?)
            .add_directive("reqwest=warn".parse()?))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match Command::parse(args.as_slice()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Invalid input: {e}");
            std::process::exit(2);
        }
    };

    let config = Config::from_env().context("Failed to load config")?;
    let client = reqwest::Client::new();

    match command.request() {
        None => watch(&config, &client).await,
        Some((endpoint, body)) => {
            match poster::post_action(&client, &config, endpoint, &body).await {
                Ok(reply) => println!("OK {reply}"),
                Err(e) => {
                    error!(error = %e, endpoint, "❌ Action failed");
                    println!("Request failed. Check the server and try again.");
                    std::process::exit(1);
                }
            }
            Ok(())
        }
    }
}

/// Poll and redraw until Ctrl-C. A failed poll keeps the last panel on
/// screen and tries again on the next tick.
async fn watch(config: &Config, client: &reqwest::Client) -> anyhow::Result<()> {
    info!(
        server   = %config.market_url,
        interval = ?config.poll_interval,
        "📈 Dashboard watching market"
    );

    let mut ticker = tokio::time::interval(config.poll_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("👋 Dashboard stopped");
                return Ok(());
            }
            _ = ticker.tick() => {
                match market::fetch_market_data(client, config).await {
                    Ok(data) => {
                        // clear screen, cursor home
                        print!("\x1B[2J\x1B[H");
                        println!("{}", render::render(&data, config.history_rows));
                    }
                    Err(e) => warn!(error = %e, "⚠️ Market poll failed, retrying next tick"),
                }
            }
        }
    }
}
