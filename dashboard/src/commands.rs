//! # commands: parse and validate user actions
//!
//! Every action is checked locally before a request is built, so a
//! malformed amount never reaches the server.
//!
//! ```text
//! watch                       poll and render until Ctrl-C (default)
//! trade <AtoB|BtoA> <amount>  execute a manual swap
//! target <price>              start or retarget the auto-trader
//! stop                        stop the auto-trader
//! add <amount_a> <amount_b>   deposit liquidity
//! remove <percentage>         withdraw a share of liquidity
//! ```

use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("'{0}' expects {1} argument(s)")]
    WrongArity(&'static str, usize),

    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),

    #[error("percentage must be in (0, 100], got {0}")]
    PercentageOutOfRange(f64),

    #[error("direction must be AtoB or BtoA, got '{0}'")]
    BadDirection(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Watch,
    Trade { direction: &'static str, amount: f64 },
    Target { price: f64 },
    Stop,
    AddLiquidity { amount_a: f64, amount_b: f64 },
    RemoveLiquidity { percentage: f64 },
}

impl Command {
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self, InputError> {
        let Some((head, rest)) = args.split_first() else {
            return Ok(Command::Watch);
        };
        let rest: Vec<&str> = rest.iter().map(|s| s.as_ref()).collect();

        match head.as_ref() {
            "watch" => Ok(Command::Watch),
            "stop" => Ok(Command::Stop),
            "trade" => {
                let [direction, amount] = arity::<2>("trade", &rest)?;
                Ok(Command::Trade {
                    direction: parse_direction(direction)?,
                    amount:    positive("amount", amount)?,
                })
            }
            "target" => {
                let [price] = arity::<1>("target", &rest)?;
                Ok(Command::Target { price: positive("target price", price)? })
            }
            "add" => {
                let [a, b] = arity::<2>("add", &rest)?;
                Ok(Command::AddLiquidity {
                    amount_a: positive("amount_a", a)?,
                    amount_b: positive("amount_b", b)?,
                })
            }
            "remove" => {
                let [pct] = arity::<1>("remove", &rest)?;
                let percentage = number(pct)?;
                if !(percentage > 0.0 && percentage <= 100.0) {
                    return Err(InputError::PercentageOutOfRange(percentage));
                }
                Ok(Command::RemoveLiquidity { percentage })
            }
            other => Err(InputError::UnknownCommand(other.to_string())),
        }
    }

    /// `(endpoint, body)` for one-shot actions, `None` for `watch`.
    pub fn request(&self) -> Option<(&'static str, Value)> {
        match *self {
            Command::Watch => None,
            Command::Trade { direction, amount } => {
                Some(("execute_trade", json!({ "direction": direction, "amount": amount })))
            }
            Command::Target { price } => Some(("set_target_price", json!({ "price": price }))),
            Command::Stop => Some(("stop_auto_trading", json!({}))),
            Command::AddLiquidity { amount_a, amount_b } => {
                Some(("add_liquidity", json!({ "amount_a": amount_a, "amount_b": amount_b })))
            }
            Command::RemoveLiquidity { percentage } => {
                Some(("remove_liquidity", json!({ "percentage": percentage })))
            }
        }
    }
}

fn arity<'a, const N: usize>(name: &'static str, args: &[&'a str]) -> Result<[&'a str; N], InputError> {
    args.try_into().map_err(|_| InputError::WrongArity(name, N))
}

fn number(raw: &str) -> Result<f64, InputError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| InputError::NotANumber(raw.to_string()))
}

fn positive(field: &'static str, raw: &str) -> Result<f64, InputError> {
    let v = number(raw)?;
    if v <= 0.0 {
        return Err(InputError::NotPositive(field));
    }
    Ok(v)
}

fn parse_direction(raw: &str) -> Result<&'static str, InputError> {
    match raw.to_ascii_lowercase().as_str() {
        "atob" | "sell" => Ok("AtoB"),
        "btoa" | "buy" => Ok("BtoA"),
        _ => Err(InputError::BadDirection(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_args_means_watch() {
        let empty: [&str; 0] = [];
        assert_eq!(Command::parse(&empty), Ok(Command::Watch));
    }

    #[test]
    fn trade_is_normalized() {
        assert_eq!(
            Command::parse(&["trade", "buy", "10"]),
            Ok(Command::Trade { direction: "BtoA", amount: 10.0 })
        );
        let (endpoint, body) = Command::parse(&["trade", "atob", "2.5"]).unwrap().request().unwrap();
        assert_eq!(endpoint, "execute_trade");
        assert_eq!(body, json!({ "direction": "AtoB", "amount": 2.5 }));
    }

    #[test]
    fn bad_amounts_are_rejected_locally() {
        assert_eq!(Command::parse(&["trade", "AtoB", "0"]), Err(InputError::NotPositive("amount")));
        assert_eq!(Command::parse(&["trade", "AtoB", "-5"]), Err(InputError::NotPositive("amount")));
        assert_eq!(
            Command::parse(&["target", "abc"]),
            Err(InputError::NotANumber("abc".into()))
        );
        assert_eq!(Command::parse(&["target", "NaN"]), Err(InputError::NotANumber("NaN".into())));
        assert_eq!(Command::parse(&["add", "1"]), Err(InputError::WrongArity("add", 2)));
    }

    #[test]
    fn remove_percentage_bounds() {
        assert!(Command::parse(&["remove", "100"]).is_ok());
        assert_eq!(Command::parse(&["remove", "0"]), Err(InputError::PercentageOutOfRange(0.0)));
        assert_eq!(
            Command::parse(&["remove", "150"]),
            Err(InputError::PercentageOutOfRange(150.0))
        );
    }

    #[test]
    fn unknown_command_and_direction() {
        assert_eq!(Command::parse(&["swap"]), Err(InputError::UnknownCommand("swap".into())));
        assert_eq!(
            Command::parse(&["trade", "up", "1"]),
            Err(InputError::BadDirection("up".into()))
        );
    }

    #[test]
    fn stop_posts_empty_body() {
        assert_eq!(Command::Stop.request(), Some(("stop_auto_trading", json!({}))));
        assert_eq!(Command::Watch.request(), None);
    }
}
