//! Domain models shared across the market engine and the HTTP layer.

pub mod market_data;
pub mod requests;
pub mod trade;

pub use market_data::MarketData;
pub use trade::{Direction, TradeRecord, TradeSource};
