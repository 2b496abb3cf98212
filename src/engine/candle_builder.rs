//! # engine::candle_builder
//!
//! **Market Data Aggregator**: folds trade prices into fixed-width OHLC
//! buckets for the dashboard chart.
//!
//! ```text
//!   price_history (closed, oldest first)          current_candle (open)
//!   [c0] [c1] [c2] ... [cN]                         [cur]
//!                        └── close ── open ──────────┘
//! ```
//! Each new bucket opens at the previous close, so history followed by the
//! current candle is a continuous series with no price gaps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

// ─── Candle ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bucket start, unix seconds (what the chart library expects)
    pub time:   i64,
    pub open:   f64,
    pub high:   f64,
    pub low:    f64,
    pub close:  f64,
    /// Sum of trade inputs inside the bucket
    pub volume: f64,
}

impl Candle {
    /// Flat candle at `price` with no volume.
    pub fn new(time: i64, price: f64) -> Self {
        Self {
            time,
            open:   price,
            high:   price,
            low:    price,
            close:  price,
            volume: 0.0,
        }
    }

    pub fn update(&mut self, price: f64, volume: f64) {
        if price > self.high {
            self.high = price;
        }
        if price < self.low {
            self.low = price;
        }
        self.close = price;
        self.volume += volume.max(0.0);
    }
}

/// Read view handed to pollers. Owned, so the market lock is released
/// before serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct CandleSnapshot {
    pub price_history:  Vec<Candle>,
    pub current_candle: Option<Candle>,
}

// ─── Aggregator ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CandleAggregator {
    bucket_secs:   i64,
    history_limit: usize,
    history:       VecDeque<Candle>,
    current:       Option<Candle>,
}

impl CandleAggregator {
    pub fn new(bucket_secs: i64, history_limit: usize) -> Self {
        Self {
            bucket_secs:   bucket_secs.max(1),
            history_limit: history_limit.max(1),
            history:       VecDeque::with_capacity(history_limit.max(1) + 1),
            current:       None,
        }
    }

    #[inline]
    fn bucket_start(&self, at: DateTime<Utc>) -> i64 {
        at.timestamp().div_euclid(self.bucket_secs) * self.bucket_secs
    }

    /// Close the open candle into history, dropping the oldest past the limit.
    fn close_current(&mut self) -> Option<Candle> {
        let closed = self.current.take()?;
        self.history.push_back(closed.clone());
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }
        Some(closed)
    }

    /// Make sure the open candle covers the bucket containing `at`.
    ///
    /// `seed_price` is only used when there is no previous candle at all;
    /// otherwise the new bucket opens at the previous close.  Returns the
    /// candle that was closed, if any.
    pub fn roll(&mut self, at: DateTime<Utc>, seed_price: f64) -> Option<Candle> {
        let bucket = self.bucket_start(at);

        match &self.current {
            Some(c) if c.time >= bucket => None,
            Some(c) => {
                let open = c.close;
                let closed = self.close_current();
                self.current = Some(Candle::new(bucket, open));
                closed
            }
            None => {
                let open = self.history.back().map(|c| c.close).unwrap_or(seed_price);
                self.current = Some(Candle::new(bucket, open));
                None
            }
        }
    }

    /// Fold one trade into the series. `price` is the pool price after the
    /// trade, `pre_trade_price` seeds the very first candle.
    pub fn record(
        &mut self,
        at: DateTime<Utc>,
        pre_trade_price: f64,
        price: f64,
        volume: f64,
    ) -> Option<Candle> {
        let closed = self.roll(at, pre_trade_price);
        if let Some(c) = self.current.as_mut() {
            c.update(price, volume);
        }
        closed
    }

    pub fn snapshot(&self) -> CandleSnapshot {
        CandleSnapshot {
            price_history:  self.history.iter().cloned().collect(),
            current_candle: self.current.clone(),
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn trades_in_same_bucket_update_in_place() {
        let mut agg = CandleAggregator::new(60, 100);
        agg.record(at(120), 1.0, 1.10, 5.0);
        agg.record(at(130), 1.10, 0.90, 3.0);
        agg.record(at(179), 0.90, 1.05, 2.0);

        let c = agg.snapshot().current_candle.unwrap();
        assert_eq!(c.time, 120);
        assert_eq!(c.open, 1.0);
        assert_eq!(c.high, 1.10);
        assert_eq!(c.low, 0.90);
        assert_eq!(c.close, 1.05);
        assert_eq!(c.volume, 10.0);
        assert_eq!(agg.snapshot().price_history.len(), 0);
    }

    #[test]
    fn new_bucket_opens_at_previous_close() {
        let mut agg = CandleAggregator::new(60, 100);
        agg.record(at(0), 1.0, 1.2, 1.0);
        let closed = agg.record(at(61), 1.2, 1.3, 1.0).unwrap();

        assert_eq!(closed.close, 1.2);
        let cur = agg.snapshot().current_candle.unwrap();
        assert_eq!(cur.time, 60);
        assert_eq!(cur.open, 1.2);
        assert_eq!(cur.close, 1.3);
    }

    #[test]
    fn roll_without_trades_opens_flat_candle() {
        let mut agg = CandleAggregator::new(60, 100);
        agg.record(at(10), 1.0, 2.0, 1.0);
        agg.roll(at(200), 99.0);

        let cur = agg.snapshot().current_candle.unwrap();
        assert_eq!(cur.time, 180);
        assert_eq!((cur.open, cur.high, cur.low, cur.close), (2.0, 2.0, 2.0, 2.0));
        assert_eq!(cur.volume, 0.0);
    }

    #[test]
    fn roll_inside_open_bucket_is_noop() {
        let mut agg = CandleAggregator::new(60, 100);
        agg.roll(at(0), 1.0);
        assert!(agg.roll(at(59), 5.0).is_none());
        assert_eq!(agg.snapshot().current_candle.unwrap().open, 1.0);
    }

    #[test]
    fn history_is_bounded() {
        let mut agg = CandleAggregator::new(1, 3);
        for s in 0..10 {
            agg.record(at(s), 1.0, 1.0 + s as f64, 1.0);
        }
        let times: Vec<i64> = agg.snapshot().price_history.iter().map(|c| c.time).collect();
        assert_eq!(times, vec![6, 7, 8]);
        assert_eq!(agg.snapshot().current_candle.unwrap().time, 9);
    }

    #[test]
    fn series_is_ordered_and_continuous() {
        let mut agg = CandleAggregator::new(5, 100);
        let mut price = 1.0;
        for (i, s) in [0, 1, 7, 8, 14, 30, 31, 46].into_iter().enumerate() {
            let next = if i % 2 == 0 { price * 1.01 } else { price * 0.995 };
            agg.record(at(s), price, next, 1.0);
            price = next;
        }

        let snap = agg.snapshot();
        let mut series = snap.price_history.clone();
        series.extend(snap.current_candle.clone());

        for pair in series.windows(2) {
            assert!(pair[0].time < pair[1].time);
            assert!((pair[1].open - pair[0].close).abs() < 1e-12);
        }
        for c in &series {
            assert!(c.low <= c.open.min(c.close));
            assert!(c.high >= c.open.max(c.close));
        }
        assert_eq!(series.last().unwrap().close, price);
    }
}
