//! Normalized pool event model

pub mod numeric;
pub mod types;

pub use types::{Currency, Liquidity, PoolEvent, PriceTable, PriceTier, SwapDirection};
