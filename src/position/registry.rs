//! Position registry and lifecycle state machine
//!
//! Owns the map of pool id to active position and drives
//! pending -> entered -> closed on each event for that pool. A pool id is
//! present only while its position is pending or entered; closing removes it,
//! freeing the pool for a future signal.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::event::PoolEvent;
use crate::strategy::signal::{PositionStatus, Signal};

/// Why an entered position was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitReason {
    TakeProfit,
    StopLoss,
}

/// Registry of active positions, one at most per pool
#[derive(Debug, Default)]
pub struct PositionRegistry {
    positions: HashMap<String, Signal>,
}

impl PositionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while the pool has a pending or entered position
    pub fn has_active(&self, pool_id: &str) -> bool {
        self.positions.contains_key(pool_id)
    }

    /// Look up the active position for a pool
    pub fn get(&self, pool_id: &str) -> Option<&Signal> {
        self.positions.get(pool_id)
    }

    /// Register a new pending position. Callers must check `has_active`
    /// first; an existing entry is silently replaced.
    pub fn add(&mut self, pool_id: &str, signal: Signal) {
        self.positions.insert(pool_id.to_string(), signal);
    }

    /// Number of active (pending or entered) positions
    pub fn active_count(&self) -> usize {
        self.positions.len()
    }

    /// Take all remaining positions, e.g. for a shutdown report
    pub fn drain(&mut self) -> Vec<Signal> {
        self.positions.drain().map(|(_, s)| s).collect()
    }

    /// Advance the lifecycle of this pool's position, if any.
    ///
    /// Pending positions enter once `now_secs` reaches their entry time (a
    /// pure time gate, no price condition). Entered positions are evaluated
    /// against stop-loss/take-profit using the fade-direction mid price; a
    /// crossing closes and removes the position.
    pub fn advance(&mut self, event: &PoolEvent, now_secs: i64) {
        let Some(position) = self.positions.get_mut(&event.pool_id) else {
            return;
        };

        match position.status {
            PositionStatus::Pending => {
                if now_secs < position.entry_time {
                    return;
                }

                position.status = PositionStatus::Entered;
                position.entry_price = fade_mid_price(position, event);
                if position.entry_price > 0.0 {
                    info!(
                        pool_id = %event.pool_id,
                        entry_price = position.entry_price,
                        "position entered"
                    );
                } else {
                    // No usable price on this event; captured on the next one.
                    info!(pool_id = %event.pool_id, "position entered, awaiting entry price");
                }
            }
            PositionStatus::Entered => {
                if position.entry_price == 0.0 {
                    position.entry_price = fade_mid_price(position, event);
                    if position.entry_price > 0.0 {
                        debug!(
                            pool_id = %event.pool_id,
                            entry_price = position.entry_price,
                            "entry price captured"
                        );
                    }
                    return;
                }

                let current = fade_mid_price(position, event);
                if current == 0.0 {
                    return;
                }

                let pnl_bp = (current / position.entry_price - 1.0) * 10_000.0;

                let reason = if pnl_bp >= position.take_profit_bp {
                    Some(ExitReason::TakeProfit)
                } else if pnl_bp <= -position.stop_loss_bp {
                    Some(ExitReason::StopLoss)
                } else {
                    None
                };

                if let Some(reason) = reason {
                    position.status = PositionStatus::Closed;
                    info!(
                        pool_id = %event.pool_id,
                        pnl_bp,
                        reason = ?reason,
                        "position closed"
                    );
                    self.positions.remove(&event.pool_id);
                }
            }
            // Closed positions are removed immediately; nothing to do.
            PositionStatus::Closed => {}
        }
    }
}

/// Mid price in the position's fade direction from the event's price table
fn fade_mid_price(position: &Signal, event: &PoolEvent) -> f64 {
    event
        .price_table
        .as_ref()
        .map(|table| table.mid_price(position.fade_direction))
        .unwrap_or(0.0)
}
