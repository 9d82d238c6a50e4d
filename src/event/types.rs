//! Normalized pool event types
//!
//! The decoder reduces the wire shape to these structs; everything downstream
//! (impact analysis, flow classification, sizing, lifecycle) works on them.

use serde::{Deserialize, Serialize};

/// Direction of a swap through the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapDirection {
    /// Selling currency A, buying currency B
    AtoB,
    /// Selling currency B, buying currency A
    BtoA,
}

impl SwapDirection {
    /// The opposite direction; a fade trades against the observed swap.
    pub fn opposite(&self) -> Self {
        match self {
            SwapDirection::AtoB => SwapDirection::BtoA,
            SwapDirection::BtoA => SwapDirection::AtoB,
        }
    }
}

impl std::fmt::Display for SwapDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SwapDirection::AtoB => write!(f, "AtoB"),
            SwapDirection::BtoA => write!(f, "BtoA"),
        }
    }
}

/// One side of the pool's currency pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Currency {
    pub symbol: String,
    pub decimals: u32,
}

impl Default for Currency {
    fn default() -> Self {
        Self {
            symbol: String::new(),
            decimals: 18,
        }
    }
}

/// Pool reserves in each currency's smallest unit
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Liquidity {
    pub amount_a: f64,
    pub amount_b: f64,
}

/// One row of a slippage tier table. Tables are ordered by increasing swap
/// size, so the last tier is the largest quoted swap.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PriceTier {
    pub slippage_bp: f64,
    pub max_amount_in: f64,
    pub max_amount_out: f64,
    pub price: f64,
}

/// Per-direction mid prices and tier tables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceTable {
    pub a_to_b_price: f64,
    pub b_to_a_price: f64,
    pub a_to_b_tiers: Vec<PriceTier>,
    pub b_to_a_tiers: Vec<PriceTier>,
}

impl PriceTable {
    /// Quoted mid price for a direction
    pub fn mid_price(&self, direction: SwapDirection) -> f64 {
        match direction {
            SwapDirection::AtoB => self.a_to_b_price,
            SwapDirection::BtoA => self.b_to_a_price,
        }
    }

    /// Tier table for a direction
    pub fn tiers(&self, direction: SwapDirection) -> &[PriceTier] {
        match direction {
            SwapDirection::AtoB => &self.a_to_b_tiers,
            SwapDirection::BtoA => &self.b_to_a_tiers,
        }
    }

    /// True when neither direction quotes any tier
    pub fn is_empty(&self) -> bool {
        self.a_to_b_tiers.is_empty() && self.b_to_a_tiers.is_empty()
    }
}

/// A normalized pool event: one liquidity/price snapshot for one pool
#[derive(Debug, Clone, Default)]
pub struct PoolEvent {
    /// Opaque pool key; empty when the feed omitted it
    pub pool_id: String,
    /// On-chain pool contract address
    pub pool_address: String,
    pub currency_a: Currency,
    pub currency_b: Currency,
    pub liquidity: Liquidity,
    pub price_table: Option<PriceTable>,
    /// Event time as a nanosecond epoch
    pub time_ns: i64,
}

impl PoolEvent {
    /// Event time in whole epoch seconds; all downstream logic works in seconds.
    pub fn time_secs(&self) -> i64 {
        self.time_ns / 1_000_000_000
    }

    /// Reserve of the currency sold in the given direction
    pub fn reserve_sold(&self, direction: SwapDirection) -> f64 {
        match direction {
            SwapDirection::AtoB => self.liquidity.amount_a,
            SwapDirection::BtoA => self.liquidity.amount_b,
        }
    }

    /// Reserve of the currency bought in the given direction
    pub fn reserve_bought(&self, direction: SwapDirection) -> f64 {
        match direction {
            SwapDirection::AtoB => self.liquidity.amount_b,
            SwapDirection::BtoA => self.liquidity.amount_a,
        }
    }

    /// Currency sold in the given direction
    pub fn currency_sold(&self, direction: SwapDirection) -> &Currency {
        match direction {
            SwapDirection::AtoB => &self.currency_a,
            SwapDirection::BtoA => &self.currency_b,
        }
    }

    /// Currency bought in the given direction
    pub fn currency_bought(&self, direction: SwapDirection) -> &Currency {
        match direction {
            SwapDirection::AtoB => &self.currency_b,
            SwapDirection::BtoA => &self.currency_a,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_opposite() {
        assert_eq!(SwapDirection::AtoB.opposite(), SwapDirection::BtoA);
        assert_eq!(SwapDirection::BtoA.opposite(), SwapDirection::AtoB);
    }

    #[test]
    fn test_time_conversion() {
        let event = PoolEvent {
            time_ns: 1_700_000_000_123_456_789,
            ..Default::default()
        };
        assert_eq!(event.time_secs(), 1_700_000_000);
    }

    #[test]
    fn test_reserve_sides() {
        let event = PoolEvent {
            liquidity: Liquidity {
                amount_a: 400.0,
                amount_b: 900.0,
            },
            ..Default::default()
        };
        assert_eq!(event.reserve_sold(SwapDirection::AtoB), 400.0);
        assert_eq!(event.reserve_bought(SwapDirection::AtoB), 900.0);
        assert_eq!(event.reserve_sold(SwapDirection::BtoA), 900.0);
        assert_eq!(event.reserve_bought(SwapDirection::BtoA), 400.0);
    }
}
