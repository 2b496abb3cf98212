//! # engine::pool
//!
//! **Reserve Pool**: two token reserves priced by the constant-product rule.
//!
//! ## Swap (exact in)
//! ```text
//! fee        = amount_in × fee_bps / 10 000
//! net        = amount_in − fee
//! amount_out = reserve_out − (reserve_in × reserve_out) / (reserve_in + net)
//! reserve_in  += amount_in      (fee stays in the pool)
//! reserve_out −= amount_out
//! ```
//! Because the fee is added to the reserves without producing output,
//! `k = reserve_a × reserve_b` never decreases across a swap.

use crate::error::MarketError;
use crate::models::Direction;

/// Basis-point denominator (10 000 = 100%).
const BPS_DENOMINATOR: f64 = 10_000.0;

// ─── Quote ────────────────────────────────────────────────────────────────────

/// Priced swap, not yet applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub direction:  Direction,
    pub amount_in:  f64,
    pub amount_out: f64,
    pub fee:        f64,
}

// ─── ReservePool ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ReservePool {
    reserve_a: f64,
    reserve_b: f64,
    fee_bps:   u32,
}

impl ReservePool {
    pub fn new(reserve_a: f64, reserve_b: f64, fee_bps: u32) -> Result<Self, MarketError> {
        if !(reserve_a.is_finite() && reserve_b.is_finite()) || reserve_a <= 0.0 || reserve_b <= 0.0 {
            return Err(MarketError::InsufficientReserve(format!(
                "genesis reserves must be positive (a={reserve_a}, b={reserve_b})"
            )));
        }
        if f64::from(fee_bps) >= BPS_DENOMINATOR {
            return Err(MarketError::InvalidAmount(format!("fee of {fee_bps} bps leaves no input")));
        }
        Ok(Self { reserve_a, reserve_b, fee_bps })
    }

    pub fn reserve_a(&self) -> f64 { self.reserve_a }
    pub fn reserve_b(&self) -> f64 { self.reserve_b }

    /// Fraction of every input kept as fee.
    #[inline]
    pub fn fee_fraction(&self) -> f64 {
        f64::from(self.fee_bps) / BPS_DENOMINATOR
    }

    /// `(reserve_in, reserve_out)` for a swap in `direction`.
    #[inline]
    pub fn reserves_for(&self, direction: Direction) -> (f64, f64) {
        match direction {
            Direction::AtoB => (self.reserve_a, self.reserve_b),
            Direction::BtoA => (self.reserve_b, self.reserve_a),
        }
    }

    /// Spot price of token A in units of token B.
    #[inline]
    pub fn price(&self) -> f64 {
        self.reserve_b / self.reserve_a
    }

    /// Constant-product invariant.
    #[inline]
    pub fn k(&self) -> f64 {
        self.reserve_a * self.reserve_b
    }

    /// Price a swap without touching the reserves.
    pub fn quote(&self, direction: Direction, amount_in: f64) -> Result<Quote, MarketError> {
        if !amount_in.is_finite() || amount_in <= 0.0 {
            return Err(MarketError::InsufficientReserve(format!(
                "amount_in must be positive, got {amount_in}"
            )));
        }

        let (reserve_in, reserve_out) = self.reserves_for(direction);
        if reserve_in <= 0.0 || reserve_out <= 0.0 {
            return Err(MarketError::InsufficientReserve("pool reserves are empty".into()));
        }

        let fee = amount_in * self.fee_fraction();
        let net = amount_in - fee;
        let amount_out = reserve_out - (reserve_in * reserve_out) / (reserve_in + net);

        if !(amount_out > 0.0) || amount_out >= reserve_out {
            return Err(MarketError::InsufficientReserve(format!(
                "{direction} swap of {amount_in} cannot be filled"
            )));
        }

        Ok(Quote { direction, amount_in, amount_out, fee })
    }

    /// Commit a quote. Both reserves change together.
    pub fn apply(&mut self, quote: &Quote) -> Result<(), MarketError> {
        let (reserve_in, reserve_out) = self.reserves_for(quote.direction);
        let new_in  = reserve_in + quote.amount_in;
        let new_out = reserve_out - quote.amount_out;

        if !(new_out > 0.0) || !new_in.is_finite() {
            return Err(MarketError::InsufficientReserve(
                "swap would empty the output reserve".into(),
            ));
        }

        match quote.direction {
            Direction::AtoB => {
                self.reserve_a = new_in;
                self.reserve_b = new_out;
            }
            Direction::BtoA => {
                self.reserve_b = new_in;
                self.reserve_a = new_out;
            }
        }
        Ok(())
    }

    /// Add both tokens without a swap (liquidity deposit).
    pub(crate) fn deposit(&mut self, amount_a: f64, amount_b: f64) {
        self.reserve_a += amount_a;
        self.reserve_b += amount_b;
    }

    /// Take both tokens out (liquidity withdrawal). Caller guarantees the
    /// amounts are strictly below the reserves.
    pub(crate) fn withdraw(&mut self, amount_a: f64, amount_b: f64) -> Result<(), MarketError> {
        let new_a = self.reserve_a - amount_a;
        let new_b = self.reserve_b - amount_b;
        if !(new_a > 0.0 && new_b > 0.0) {
            return Err(MarketError::InsufficientReserve(
                "withdrawal would empty the pool".into(),
            ));
        }
        self.reserve_a = new_a;
        self.reserve_b = new_b;
        Ok(())
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pool(a: f64, b: f64) -> ReservePool {
        ReservePool::new(a, b, 0).unwrap()
    }

    #[test]
    fn price_is_b_over_a() {
        assert_eq!(pool(1000.0, 2000.0).price(), 2.0);
    }

    #[test]
    fn quote_matches_reference_scenario() {
        // {A:1000, B:1000}, A→B 10 → out = 10 × 1000 / 1010
        let mut p = pool(1000.0, 1000.0);
        let q = p.quote(Direction::AtoB, 10.0).unwrap();
        assert!((q.amount_out - 9.900990099).abs() < 1e-6);

        p.apply(&q).unwrap();
        assert_eq!(p.reserve_a(), 1010.0);
        assert!((p.reserve_b() - 990.0990099).abs() < 1e-6);
    }

    #[test]
    fn b_to_a_raises_price() {
        let mut p = pool(1000.0, 1000.0);
        let q = p.quote(Direction::BtoA, 50.0).unwrap();
        p.apply(&q).unwrap();
        assert!(p.price() > 1.0);
    }

    #[test]
    fn quote_rejects_non_positive_input() {
        let p = pool(1000.0, 1000.0);
        for bad in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                p.quote(Direction::AtoB, bad),
                Err(MarketError::InsufficientReserve(_))
            ));
        }
    }

    #[test]
    fn genesis_requires_positive_reserves() {
        assert!(ReservePool::new(0.0, 10.0, 0).is_err());
        assert!(ReservePool::new(10.0, -1.0, 0).is_err());
        assert!(ReservePool::new(10.0, 10.0, 10_000).is_err());
    }

    #[test]
    fn fee_stays_in_pool() {
        let mut p = ReservePool::new(1000.0, 1000.0, 30).unwrap();
        let q = p.quote(Direction::AtoB, 100.0).unwrap();
        assert!((q.fee - 0.3).abs() < 1e-12);

        let k_before = p.k();
        p.apply(&q).unwrap();
        assert!(p.k() > k_before);
    }

    #[test]
    fn withdraw_cannot_empty_pool() {
        let mut p = pool(100.0, 100.0);
        assert!(p.withdraw(100.0, 50.0).is_err());
        assert_eq!(p.reserve_a(), 100.0);
        p.withdraw(50.0, 50.0).unwrap();
        assert_eq!(p.reserve_b(), 50.0);
    }

    proptest! {
        #[test]
        fn swaps_never_decrease_k(
            ra in 1_000.0f64..1e9,
            rb in 1_000.0f64..1e9,
            fee_bps in 0u32..100,
            fraction in 1e-6f64..0.5,
            a_to_b in any::<bool>(),
        ) {
            let mut p = ReservePool::new(ra, rb, fee_bps).unwrap();
            let direction = if a_to_b { Direction::AtoB } else { Direction::BtoA };
            let (reserve_in, _) = p.reserves_for(direction);

            let k_before = p.k();
            let q = p.quote(direction, reserve_in * fraction).unwrap();
            p.apply(&q).unwrap();

            // relative tolerance for f64 rounding
            prop_assert!(p.k() >= k_before * (1.0 - 1e-12));
            prop_assert!(p.reserve_a() > 0.0 && p.reserve_b() > 0.0);
        }

        #[test]
        fn selling_a_moves_price_down(
            ra in 1_000.0f64..1e9,
            rb in 1_000.0f64..1e9,
            fraction in 1e-4f64..0.5,
        ) {
            let mut p = ReservePool::new(ra, rb, 0).unwrap();
            let before = p.price();
            let q = p.quote(Direction::AtoB, ra * fraction).unwrap();
            p.apply(&q).unwrap();
            prop_assert!(p.price() < before);
        }
    }
}
