//! # models::requests
//!
//! JSON bodies accepted by the POST endpoints.
//!
//! Numeric fields take either a JSON number or a numeric string such as
//! `"12.5"`, which is what form inputs tend to send.  Range checks live in
//! the engine, not here.

use serde::Deserialize;

use crate::models::Direction;

/// Provider used when a liquidity request does not name one.
/// The genesis reserves belong to this provider.
pub const DEFAULT_PROVIDER: &str = "operator";

#[derive(Debug, Deserialize)]
pub struct TradeRequest {
    pub direction: Direction,
    #[serde(deserialize_with = "lenient_f64::deserialize")]
    pub amount:    f64,
}

#[derive(Debug, Deserialize)]
pub struct TargetPriceRequest {
    #[serde(deserialize_with = "lenient_f64::deserialize")]
    pub price: f64,
}

#[derive(Debug, Deserialize)]
pub struct AddLiquidityRequest {
    #[serde(deserialize_with = "lenient_f64::deserialize")]
    pub amount_a: f64,
    #[serde(deserialize_with = "lenient_f64::deserialize")]
    pub amount_b: f64,
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveLiquidityRequest {
    #[serde(deserialize_with = "lenient_f64::deserialize")]
    pub percentage: f64,
    #[serde(default)]
    pub provider:   Option<String>,
}

/// Resolve the optional provider field, treating blank names as absent.
pub fn provider_or_default(provider: Option<String>) -> String {
    provider
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| DEFAULT_PROVIDER.to_string())
}

/// Accepts a JSON number or a numeric string.
mod lenient_f64 {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        String(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match NumberOrString::deserialize(deserializer)? {
            NumberOrString::Number(n) => Ok(n),
            NumberOrString::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| serde::de::Error::custom(format!("Invalid number: {s}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trade_request_accepts_numeric_string() {
        let req: TradeRequest =
            serde_json::from_str(r#"{"direction":"AtoB","amount":"12.5"}"#).unwrap();
        assert_eq!(req.direction, Direction::AtoB);
        assert_eq!(req.amount, 12.5);
    }

    #[test]
    fn trade_request_rejects_garbage_amount() {
        let res = serde_json::from_str::<TradeRequest>(r#"{"direction":"AtoB","amount":"ten"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn blank_provider_falls_back_to_default() {
        assert_eq!(provider_or_default(None), DEFAULT_PROVIDER);
        assert_eq!(provider_or_default(Some("  ".into())), DEFAULT_PROVIDER);
        assert_eq!(provider_or_default(Some("alice".into())), "alice");
    }
}
