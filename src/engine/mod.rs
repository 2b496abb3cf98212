//! Market engine: pool math, executor, liquidity, candles and the
//! auto-trading controller.  Nothing in here knows about HTTP.

pub mod auto_trader;
pub mod candle_builder;
pub mod executor;
pub mod liquidity;
pub mod market;
pub mod pool;
