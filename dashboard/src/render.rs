//! # render: plain-text market panel
//!
//! ```text
//! Reserve A   1,000,000.00      Target   1.050000
//! Reserve B   1,012,000.00      Auto     running
//! Price       1.012000
//!
//!  time       open       high       low        close      volume
//!  12:01:00   1.010000   1.013000   1.009000   1.012000   3,200.00
//! ```

use chrono::{DateTime, Utc};
use std::fmt::Write;

use crate::market::{Candle, MarketData};

/// Fixed two decimals with `,` thousands separators.
pub fn format_amount(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (i, ch) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac}")
}

pub fn format_price(value: f64) -> String {
    format!("{value:.6}")
}

fn format_time(unix: i64) -> String {
    DateTime::<Utc>::from_timestamp(unix, 0)
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| unix.to_string())
}

fn candle_row(out: &mut String, c: &Candle) {
    let _ = writeln!(
        out,
        " {:<10} {:<10} {:<10} {:<10} {:<10} {}",
        format_time(c.time),
        format_price(c.open),
        format_price(c.high),
        format_price(c.low),
        format_price(c.close),
        format_amount(c.volume),
    );
}

/// Render the latest poll. `rows` caps the candle table (newest kept).
pub fn render(data: &MarketData, rows: usize) -> String {
    let target = data.target_price.map(format_price).unwrap_or_else(|| "-".to_string());
    let status = if data.auto_trading { "running" } else { "stopped" };

    let mut out = String::new();
    let _ = writeln!(out, "Reserve A   {:<18}Target   {target}", format_amount(data.token_a_reserve));
    let _ = writeln!(out, "Reserve B   {:<18}Auto     {status}", format_amount(data.token_b_reserve));
    let _ = writeln!(out, "Price       {}", format_price(data.current_price));

    let series: Vec<&Candle> = data.series().collect();
    if series.is_empty() {
        return out;
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        " {:<10} {:<10} {:<10} {:<10} {:<10} volume",
        "time", "open", "high", "low", "close"
    );
    let skip = series.len().saturating_sub(rows);
    for c in &series[skip..] {
        candle_row(&mut out, c);
    }
    out
}
