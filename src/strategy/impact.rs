//! Price impact analysis over tiered slippage data
//!
//! Scans the pool's slippage tier tables for the largest swap whose quoted
//! slippage falls inside the fadeable band and whose size is material
//! relative to the sell-side reserve.

use crate::config::StrategyConfig;
use crate::event::{PoolEvent, SwapDirection};

/// A qualifying price impact found in an event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactResult {
    /// Deviation of the tier's execution price from the mid price, in basis points
    pub impact_bp: f64,
    /// Direction of the aggressive swap
    pub direction: SwapDirection,
    /// Swap size that produced the impact, in smallest units of the sold currency
    pub swap_size: f64,
}

/// Analyzes pool events for fadeable price impacts. Pure; holds only config.
#[derive(Debug, Clone)]
pub struct ImpactAnalyzer {
    min_impact_bp: f64,
    max_impact_bp: f64,
    min_liquidity_ratio: f64,
}

impl ImpactAnalyzer {
    pub fn new(config: &StrategyConfig) -> Self {
        Self {
            min_impact_bp: config.min_impact_bp,
            max_impact_bp: config.max_impact_bp,
            min_liquidity_ratio: config.min_liquidity_ratio,
        }
    }

    /// Find a qualifying impact in the event, if any.
    ///
    /// AtoB is checked before BtoA and the first qualifying direction wins,
    /// regardless of which direction shows the larger impact. Callers must
    /// not assume the larger move is returned.
    pub fn analyze(&self, event: &PoolEvent) -> Option<ImpactResult> {
        let table = event.price_table.as_ref()?;
        if table.is_empty() {
            return None;
        }

        if event.liquidity.amount_a == 0.0 || event.liquidity.amount_b == 0.0 {
            return None;
        }

        self.check_direction(event, SwapDirection::AtoB)
            .or_else(|| self.check_direction(event, SwapDirection::BtoA))
    }

    /// Check one direction's tier table, largest swap first.
    fn check_direction(&self, event: &PoolEvent, direction: SwapDirection) -> Option<ImpactResult> {
        let table = event.price_table.as_ref()?;
        let tiers = table.tiers(direction);
        if tiers.is_empty() {
            return None;
        }

        let mid_price = table.mid_price(direction);
        let base_liquidity = event.reserve_sold(direction);

        // Tiers are ordered by increasing swap size; walk from the largest down.
        for tier in tiers.iter().rev() {
            if tier.slippage_bp < self.min_impact_bp || tier.slippage_bp > self.max_impact_bp {
                continue;
            }

            if mid_price == 0.0 {
                continue;
            }

            let impact_bp = (1.0 - tier.price / mid_price).abs() * 10_000.0;

            // Materiality gate: the swap must be large relative to the reserve
            // of the currency being sold.
            let liquidity_ratio = if base_liquidity > 0.0 {
                tier.max_amount_in / base_liquidity
            } else {
                0.0
            };

            if liquidity_ratio >= self.min_liquidity_ratio {
                return Some(ImpactResult {
                    impact_bp,
                    direction,
                    swap_size: tier.max_amount_in,
                });
            }
        }

        None
    }
}
