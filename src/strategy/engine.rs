//! Fade engine
//!
//! Thin per-event orchestrator: advance the lifecycle of any active position
//! for the pool first, then run the signal decision. One event at a time,
//! fully processed before the next; the per-pool state below assumes a
//! single ordered consumer.

use tracing::info;

use crate::config::StrategyConfig;
use crate::event::{numeric::format_amount, PoolEvent};
use crate::position::PositionRegistry;

use super::signal::{Signal, SignalBuilder};

/// Time source for entry scheduling and lifecycle gating. Injected so tests
/// can drive the clock deterministically.
pub trait Clock {
    fn now_secs(&self) -> i64;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// The fade engine: signal builder + position registry + clock
pub struct FadeEngine<C: Clock = SystemClock> {
    builder: SignalBuilder,
    registry: PositionRegistry,
    clock: C,
    signals_emitted: u64,
}

impl FadeEngine<SystemClock> {
    pub fn new(config: &StrategyConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> FadeEngine<C> {
    pub fn with_clock(config: &StrategyConfig, clock: C) -> Self {
        Self {
            builder: SignalBuilder::new(config),
            registry: PositionRegistry::new(),
            clock,
            signals_emitted: 0,
        }
    }

    /// Process one pool event: lifecycle first, then the fade decision.
    pub fn process(&mut self, event: &PoolEvent) -> Option<Signal> {
        let now_secs = self.clock.now_secs();

        self.registry.advance(event, now_secs);

        if event.pool_id.is_empty() {
            return None;
        }

        let impact = self.builder.analyze(event)?;

        // Log the detected opportunity before any veto can suppress it.
        let sold = event.currency_sold(impact.direction);
        info!(
            pool_id = %event.pool_id,
            direction = %impact.direction,
            impact_bp = impact.impact_bp,
            swap_size = %format_amount(impact.swap_size, sold.decimals, 2),
            symbol = %sold.symbol,
            "price impact detected"
        );

        let signal = self
            .builder
            .decide_with(event, &impact, &mut self.registry, now_secs)?;
        self.signals_emitted += 1;

        info!(
            pool_id = %signal.pool_id,
            signal = %signal,
            entry_time = signal.entry_time,
            stop_loss_bp = signal.stop_loss_bp,
            take_profit_bp = signal.take_profit_bp,
            "fade signal"
        );

        Some(signal)
    }

    /// Signals emitted since startup
    pub fn signals_emitted(&self) -> u64 {
        self.signals_emitted
    }

    /// Currently tracked positions
    pub fn registry(&self) -> &PositionRegistry {
        &self.registry
    }

    /// Take all remaining positions, e.g. for a shutdown report
    pub fn drain_positions(&mut self) -> Vec<Signal> {
        self.registry.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Currency, Liquidity, PoolEvent, PriceTable, PriceTier};
    use crate::strategy::signal::PositionStatus;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Manually driven clock for deterministic lifecycle tests
    #[derive(Clone)]
    struct ManualClock(Rc<Cell<i64>>);

    impl Clock for ManualClock {
        fn now_secs(&self) -> i64 {
            self.0.get()
        }
    }

    fn shock_event(pool_id: &str, time_secs: i64) -> PoolEvent {
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

    /// Same pool, no qualifying impact, just a price quote
    fn quote_event(pool_id: &str, b_to_a_price: f64, time_secs: i64) -> PoolEvent {
        PoolEvent {
            pool_id: pool_id.to_string(),
            liquidity: Liquidity {
                amount_a: 400.0,
                amount_b: 900.0,
            },
            price_table: Some(PriceTable {
                a_to_b_price: 1.0,
                b_to_a_price,
                ..Default::default()
            }),
            time_ns: time_secs * 1_000_000_000,
            ..Default::default()
        }
    }

    fn engine_at(start_secs: i64) -> (FadeEngine<ManualClock>, Rc<Cell<i64>>) {
        let time = Rc::new(Cell::new(start_secs));
        let engine = FadeEngine::with_clock(
            &crate::config::StrategyConfig::default(),
            ManualClock(time.clone()),
        );
        (engine, time)
    }

    #[test]
    fn test_full_lifecycle() {
        let (mut engine, time) = engine_at(1000);

        // Shock -> pending signal, entry_time = 1002
        let signal = engine.process(&shock_event("pool-1", 1000)).unwrap();
        assert_eq!(signal.entry_time, 1002);
        assert_eq!(engine.signals_emitted(), 1);

        // Before entry time: still pending
        time.set(1001);
        engine.process(&quote_event("pool-1", 1.0, 1001));
        assert_eq!(
            engine.registry().get("pool-1").unwrap().status,
            PositionStatus::Pending
        );

        // At entry time: entered, entry price captured
        time.set(1002);
        engine.process(&quote_event("pool-1", 1.0, 1002));
        let position = engine.registry().get("pool-1").unwrap();
        assert_eq!(position.status, PositionStatus::Entered);
        assert_eq!(position.entry_price, 1.0);

        // Favorable move past take profit closes and frees the pool
        time.set(1003);
        engine.process(&quote_event("pool-1", 1.006, 1003));
        assert!(!engine.registry().has_active("pool-1"));
    }

    #[test]
    fn test_pool_reusable_after_close() {
        let (mut engine, time) = engine_at(1000);

        engine.process(&shock_event("pool-1", 1000)).unwrap();
        time.set(1002);
        engine.process(&quote_event("pool-1", 1.0, 1002));
        time.set(1003);
        engine.process(&quote_event("pool-1", 1.006, 1003));
        assert!(!engine.registry().has_active("pool-1"));

        // Well outside the flow window, a new shock can be faded again
        time.set(2000);
        let signal = engine.process(&shock_event("pool-1", 2000));
        assert!(signal.is_some());
        assert_eq!(engine.signals_emitted(), 2);
    }

    #[test]
    fn test_no_duplicate_signal_while_active() {
        let (mut engine, time) = engine_at(1000);

        // Two shocks far apart in event time (so flow stays isolated), but
        // the first position is still active
        engine.process(&shock_event("pool-1", 1000)).unwrap();
        time.set(1100);
        assert!(engine.process(&shock_event("pool-1", 1100)).is_none());
        assert_eq!(engine.signals_emitted(), 1);
    }

    #[test]
    fn test_unnamed_pool_event_is_ignored() {
        let (mut engine, _time) = engine_at(1000);

        // A qualifying shock without a pool id produces nothing, not even
        // the impact diagnostics path
        assert!(engine.process(&shock_event("", 1000)).is_none());
        assert_eq!(engine.signals_emitted(), 0);
        assert_eq!(engine.registry().active_count(), 0);
    }

    #[test]
    fn test_drain_positions() {
        let (mut engine, _time) = engine_at(1000);
        engine.process(&shock_event("pool-1", 1000)).unwrap();
        engine.process(&shock_event("pool-2", 1000)).unwrap();
        let remaining = engine.drain_positions();
        assert_eq!(remaining.len(), 2);
        assert_eq!(engine.registry().active_count(), 0);
    }
}
