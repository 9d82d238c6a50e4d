//! Liquidity-aware position sizing
//!
//! Sizes the contrarian position from the buy-side reserve, damped by the
//! observed impact: the harder the move, the smaller the bet.

use crate::config::StrategyConfig;
use crate::event::{PoolEvent, SwapDirection};

/// Impact damping never shrinks the size below this fraction of the cap.
const MIN_IMPACT_FACTOR: f64 = 0.1;

/// Position sizer. Pure; holds only config.
#[derive(Debug, Clone)]
pub struct PositionSizer {
    max_position_size_ratio: f64,
    min_position_size: f64,
}

impl PositionSizer {
    pub fn new(config: &StrategyConfig) -> Self {
        Self {
            max_position_size_ratio: config.max_position_size_ratio,
            min_position_size: config.min_position_size,
        }
    }

    /// Calculate the position size in smallest units of the currency the
    /// fade buys. Returns 0 when that side of the pool has no reserve.
    ///
    /// The size is monotonic in liquidity and anti-monotonic in impact:
    ///   factor = max(0.1, 1 / (1 + impact_bp / 1000))
    ///   raw    = reserve * max_ratio * factor
    /// floored at min_position_size scaled by the bought currency's decimals.
    pub fn size(&self, event: &PoolEvent, impact_bp: f64, fade_direction: SwapDirection) -> f64 {
        let base_liquidity = event.reserve_bought(fade_direction);
        if base_liquidity == 0.0 {
            return 0.0;
        }

        let decimals = event.currency_bought(fade_direction).decimals;

        let impact_factor = (1.0 / (1.0 + impact_bp / 1000.0)).max(MIN_IMPACT_FACTOR);
        let raw_size = base_liquidity * self.max_position_size_ratio * impact_factor;

        let floor = self.min_position_size * 10f64.powi(decimals as i32);

        raw_size.max(floor)
    }
}
