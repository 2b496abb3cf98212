//! # config
//!
//! Market configuration read from environment variables (after `.env` is
//! loaded by `dotenvy`).  Defaults: 1M/1M reserves, one-minute candles and
//! 100 candles of history.

use std::time::Duration;

use crate::engine::liquidity::DEFAULT_MAX_PROVIDERS;

// ─── Config ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MarketConfig {
    /// Genesis reserve of token A
    pub initial_reserve_a: f64,
    /// Genesis reserve of token B
    pub initial_reserve_b: f64,
    /// Swap fee in basis points, kept inside the pool (0 = no fee)
    pub fee_bps: u32,
    /// Candle bucket width in seconds
    pub candle_secs: i64,
    /// Closed candles kept in `price_history`
    pub history_limit: usize,
    /// Trade records kept for `/api/trades`
    pub trade_log_limit: usize,
    /// Distinct liquidity providers the ledger will hold
    pub max_providers: usize,
    /// Required `X-API-Key` value; `None` leaves the API open
    pub api_key: Option<String>,
    pub auto: AutoTradingConfig,
}

#[derive(Debug, Clone)]
pub struct AutoTradingConfig {
    /// Controller cadence
    pub tick_interval: Duration,
    /// A tick that takes longer than this counts as failed
    pub tick_timeout: Duration,
    /// Relative distance from target treated as "reached"
    pub tolerance: f64,
    /// Largest single trade, as a fraction of the input reserve
    pub max_step_fraction: f64,
    /// Stop automatically once the target is reached
    pub stop_on_target: bool,
}

impl MarketConfig {
    pub fn from_env() -> Self {
        Self {
            initial_reserve_a: env_f64("INITIAL_RESERVE_A", 1_000_000.0),
            initial_reserve_b: env_f64("INITIAL_RESERVE_B", 1_000_000.0),
            fee_bps:           env_parse("FEE_BPS", 0u32),
            candle_secs:       env_parse("CANDLE_SECS", 60i64).max(1),
            history_limit:     env_parse("HISTORY_LIMIT", 100usize),
            trade_log_limit:   env_parse("TRADE_LOG_LIMIT", 500usize),
            max_providers:     env_parse("MAX_PROVIDERS", DEFAULT_MAX_PROVIDERS),
            api_key:           std::env::var("API_KEY").ok().filter(|k| !k.is_empty()),
            auto: AutoTradingConfig {
                tick_interval:     Duration::from_millis(env_parse("AUTO_TICK_MS", 1000u64).max(1)),
                tick_timeout:      Duration::from_millis(env_parse("AUTO_TICK_TIMEOUT_MS", 500u64)),
                tolerance:         env_f64("AUTO_TOLERANCE", 0.0001),
                max_step_fraction: env_f64("AUTO_MAX_STEP", 0.01),
                stop_on_target:    env_bool("AUTO_STOP_ON_TARGET", false),
            },
        }
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            initial_reserve_a: 1_000_000.0,
            initial_reserve_b: 1_000_000.0,
            fee_bps:           0,
            candle_secs:       60,
            history_limit:     100,
            trade_log_limit:   500,
            max_providers:     DEFAULT_MAX_PROVIDERS,
            api_key:           None,
            auto:              AutoTradingConfig::default(),
        }
    }
}

impl Default for AutoTradingConfig {
    fn default() -> Self {
        Self {
            tick_interval:     Duration::from_secs(1),
            tick_timeout:      Duration::from_millis(500),
            tolerance:         0.0001,
            max_step_fraction: 0.01,
            stop_on_target:    false,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_f64(key: &str, default: f64) -> f64 {
    let value: f64 = env_parse(key, default);
    if value.is_finite() && value > 0.0 { value } else { default }
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}
