//! Fade signal construction
//!
//! Composes impact analysis, flow classification, and sizing into the
//! per-event decision, and builds the signal record the registry tracks.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::StrategyConfig;
use crate::event::{numeric::format_amount, PoolEvent, SwapDirection};
use crate::position::PositionRegistry;

use super::flow::FlowClassifier;
use super::impact::{ImpactAnalyzer, ImpactResult};
use super::sizing::PositionSizer;

/// Lifecycle state of a signal/position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionStatus {
    /// Created, waiting for the entry delay to elapse
    Pending,
    /// Entry time reached; position is live
    Entered,
    /// Exited; terminal
    Closed,
}

/// A contrarian trade intent. Doubles as the position record tracked by the
/// registry through its lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub pool_id: String,
    pub pool_address: String,
    pub currency_a: String,
    pub currency_b: String,
    /// Direction of the aggressive swap being faded
    pub swap_direction: SwapDirection,
    /// Direction of our trade (opposite of the swap)
    pub fade_direction: SwapDirection,
    pub impact_bp: f64,
    /// Size of the observed swap, smallest units of its sold currency
    pub swap_size: f64,
    pub swap_size_decimals: u32,
    /// Our position size, smallest units of the bought currency
    pub position_size: f64,
    pub position_size_decimals: u32,
    /// Absolute epoch seconds at which the position becomes enterable
    pub entry_time: i64,
    /// Fade-direction mid price captured at entry; 0.0 until captured
    pub entry_price: f64,
    pub stop_loss_bp: f64,
    pub take_profit_bp: f64,
    pub status: PositionStatus,
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} fade {} impact {:.2}bp size {}",
            self.currency_a,
            self.currency_b,
            self.fade_direction,
            self.impact_bp,
            format_amount(self.position_size, self.position_size_decimals, 2),
        )
    }
}

/// Builds fade signals from pool events.
///
/// Decision order matters: impact first, then the flow and registry vetoes,
/// so veto diagnostics always describe a real opportunity.
pub struct SignalBuilder {
    impact: ImpactAnalyzer,
    flow: FlowClassifier,
    sizer: PositionSizer,
    wait_time_secs: i64,
    stop_loss_bp: f64,
    take_profit_bp: f64,
}

impl SignalBuilder {
    pub fn new(config: &StrategyConfig) -> Self {
        Self {
            impact: ImpactAnalyzer::new(config),
            flow: FlowClassifier::new(config),
            sizer: PositionSizer::new(config),
            wait_time_secs: config.wait_time_secs,
            stop_loss_bp: config.stop_loss_bp,
            take_profit_bp: config.take_profit_bp,
        }
    }

    /// Analyze the event for a qualifying impact without deciding.
    pub fn analyze(&self, event: &PoolEvent) -> Option<ImpactResult> {
        self.impact.analyze(event)
    }

    /// Decide whether to fade this event; on success the signal is
    /// registered as a pending position and returned.
    pub fn decide(
        &mut self,
        event: &PoolEvent,
        registry: &mut PositionRegistry,
        now_secs: i64,
    ) -> Option<Signal> {
        if event.pool_id.is_empty() {
            return None;
        }

        let impact = self.impact.analyze(event)?;
        self.decide_with(event, &impact, registry, now_secs)
    }

    /// Decision sequence for an already-analyzed impact: flow veto, registry
    /// veto, then build and register. Callers that logged the impact use
    /// this to avoid re-running the analysis.
    pub fn decide_with(
        &mut self,
        event: &PoolEvent,
        impact: &ImpactResult,
        registry: &mut PositionRegistry,
        now_secs: i64,
    ) -> Option<Signal> {
        let isolated = self
            .flow
            .classify(&event.pool_id, impact.direction, event.time_secs());
        if !isolated {
            debug!(
                pool_id = %event.pool_id,
                direction = %impact.direction,
                "skip: persistent flow, not fading"
            );
            return None;
        }

        if registry.has_active(&event.pool_id) {
            debug!(pool_id = %event.pool_id, "skip: active position exists");
            return None;
        }

        let signal = self.build(event, impact, now_secs);
        registry.add(&event.pool_id, signal.clone());
        Some(signal)
    }

    fn build(&self, event: &PoolEvent, impact: &ImpactResult, now_secs: i64) -> Signal {
        let fade_direction = impact.direction.opposite();
        let position_size = self.sizer.size(event, impact.impact_bp, fade_direction);

        Signal {
            pool_id: event.pool_id.clone(),
            pool_address: event.pool_address.clone(),
            currency_a: event.currency_a.symbol.clone(),
            currency_b: event.currency_b.symbol.clone(),
            swap_direction: impact.direction,
            fade_direction,
            impact_bp: impact.impact_bp,
            swap_size: impact.swap_size,
            swap_size_decimals: event.currency_sold(impact.direction).decimals,
            position_size,
            position_size_decimals: event.currency_bought(fade_direction).decimals,
            entry_time: now_secs + self.wait_time_secs,
            entry_price: 0.0,
            stop_loss_bp: self.stop_loss_bp,
            take_profit_bp: self.take_profit_bp,
            status: PositionStatus::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Currency, Liquidity, PoolEvent, PriceTable, PriceTier};

    fn test_event(pool_id: &str, time_secs: i64) -> PoolEvent {
        PoolEvent {
            pool_id: pool_id.to_string(),
            pool_address: "0xabc".to_string(),
            currency_a: Currency {
                symbol: "WETH".to_string(),
                decimals: 18,
            },
            currency_b: Currency {
                symbol: "USDC".to_string(),
                decimals: 6,
            },
            liquidity: Liquidity {
                amount_a: 400.0,
                amount_b: 900.0,
            },
            price_table: Some(PriceTable {
                a_to_b_price: 1.0,
                b_to_a_price: 1.0,
                a_to_b_tiers: vec![PriceTier {
                    slippage_bp: 80.0,
                    max_amount_in: 50.0,
                    max_amount_out: 0.0,
                    price: 0.95,
                }],
                b_to_a_tiers: vec![],
            }),
            time_ns: time_secs * 1_000_000_000,
        }
    }

    fn builder() -> SignalBuilder {
        SignalBuilder::new(&StrategyConfig::default())
    }

    #[test]
    fn test_emits_signal_for_qualifying_event() {
        let mut b = builder();
        let mut registry = PositionRegistry::new();
        let event = test_event("pool-1", 100);

        let signal = b.decide(&event, &mut registry, 1000).unwrap();
        assert_eq!(signal.swap_direction, SwapDirection::AtoB);
        assert_eq!(signal.fade_direction, SwapDirection::BtoA);
        assert!((signal.impact_bp - 500.0).abs() < 1e-9);
        assert_eq!(signal.swap_size, 50.0);
        assert_eq!(signal.swap_size_decimals, 18); // sold currency A
        assert_eq!(signal.position_size_decimals, 18); // bought currency A
        assert_eq!(signal.entry_time, 1002); // now + wait_time 2s
        assert_eq!(signal.status, PositionStatus::Pending);
        assert!(registry.has_active("pool-1"));
    }

    #[test]
    fn test_empty_pool_id_is_rejected() {
        let mut b = builder();
        let mut registry = PositionRegistry::new();
        let event = test_event("", 100);
        assert!(b.decide(&event, &mut registry, 1000).is_none());
    }

    #[test]
    fn test_no_impact_no_signal() {
        let mut b = builder();
        let mut registry = PositionRegistry::new();
        let mut event = test_event("pool-1", 100);
        event.price_table = None;
        assert!(b.decide(&event, &mut registry, 1000).is_none());
    }

    #[test]
    fn test_registry_veto_blocks_duplicate() {
        let mut b = builder();
        let mut registry = PositionRegistry::new();

        assert!(b
            .decide(&test_event("pool-1", 100), &mut registry, 1000)
            .is_some());
        // Second qualifying event for the same pool: vetoed
        assert!(b
            .decide(&test_event("pool-1", 101), &mut registry, 1001)
            .is_none());
        assert_eq!(registry.active_count(), 1);
    }

    #[test]
    fn test_persistent_flow_veto() {
        let mut b = builder();
        let mut registry = PositionRegistry::new();

        // Use distinct registries per decision so only the flow check vetoes
        let mut scratch = PositionRegistry::new();
        assert!(b.decide(&test_event("pool-1", 0), &mut scratch, 0).is_some());
        let mut scratch = PositionRegistry::new();
        assert!(b.decide(&test_event("pool-1", 5), &mut scratch, 5).is_some());
        // Third same-direction event inside the window: persistent
        assert!(b
            .decide(&test_event("pool-1", 10), &mut registry, 10)
            .is_none());
        assert_eq!(registry.active_count(), 0);
    }
}
