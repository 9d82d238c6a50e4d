//! Isolated-shock vs persistent-flow classification
//!
//! A single aggressive swap is fadeable; repeated swaps in the same direction
//! are a trend we must not bet against. Keeps a small per-pool history of
//! recent swap directions to tell the two apart.

use std::collections::{HashMap, VecDeque};

use crate::config::StrategyConfig;
use crate::event::SwapDirection;

/// Per-pool history is capped at this many records regardless of the window.
const HISTORY_CAPACITY: usize = 10;

/// One retained observation
#[derive(Debug, Clone, Copy)]
struct FlowRecord {
    direction: SwapDirection,
    time_secs: i64,
}

/// Stateful per-pool flow classifier
#[derive(Debug)]
pub struct FlowClassifier {
    window_secs: i64,
    max_same_direction: usize,
    history: HashMap<String, VecDeque<FlowRecord>>,
}

impl FlowClassifier {
    pub fn new(config: &StrategyConfig) -> Self {
        Self {
            window_secs: config.flow_window_secs,
            max_same_direction: config.max_same_direction_events,
            history: HashMap::new(),
        }
    }

    /// Classify the current swap and record it.
    ///
    /// Returns true when the swap is an isolated shock (safe to fade).
    /// Classification and the history update are one atomic step; callers
    /// must feed a pool's events in order.
    pub fn classify(&mut self, pool_id: &str, direction: SwapDirection, now_secs: i64) -> bool {
        let history = self.history.entry(pool_id.to_string()).or_default();

        // Drop records that fell out of the detection window.
        history.retain(|record| now_secs - record.time_secs < self.window_secs);

        let same_direction_count = history
            .iter()
            .filter(|record| record.direction == direction)
            .count();

        // Record the current swap post-filter, bounded to capacity.
        history.push_back(FlowRecord {
            direction,
            time_secs: now_secs,
        });
        while history.len() > HISTORY_CAPACITY {
            history.pop_front();
        }

        same_direction_count <= self.max_same_direction
    }

    /// Number of pools with retained history
    pub fn pool_count(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> FlowClassifier {
        // Defaults: window 30s, max_same_direction 1
        FlowClassifier::new(&StrategyConfig::default())
    }

    #[test]
    fn test_first_event_is_isolated() {
        let mut flow = classifier();
        assert!(flow.classify("pool-1", SwapDirection::AtoB, 0));
    }

    #[test]
    fn test_third_same_direction_event_is_persistent() {
        let mut flow = classifier();
        assert!(flow.classify("pool-1", SwapDirection::AtoB, 0)); // count 0
        assert!(flow.classify("pool-1", SwapDirection::AtoB, 5)); // count 1 <= 1
        assert!(!flow.classify("pool-1", SwapDirection::AtoB, 10)); // count 2
    }

    #[test]
    fn test_opposite_direction_does_not_count() {
        let mut flow = classifier();
        flow.classify("pool-1", SwapDirection::AtoB, 0);
        flow.classify("pool-1", SwapDirection::AtoB, 1);
        // Two AtoB records retained, but this one is BtoA
        assert!(flow.classify("pool-1", SwapDirection::BtoA, 2));
    }

    #[test]
    fn test_window_expiry_resets_count() {
        let mut flow = classifier();
        flow.classify("pool-1", SwapDirection::AtoB, 0);
        flow.classify("pool-1", SwapDirection::AtoB, 1);
        // 31s later both records are outside the 30s window
        assert!(flow.classify("pool-1", SwapDirection::AtoB, 31));
    }

    #[test]
    fn test_window_boundary_is_exclusive() {
        let mut flow = classifier();
        flow.classify("pool-1", SwapDirection::AtoB, 0);
        flow.classify("pool-1", SwapDirection::AtoB, 1);
        // The t=0 record is exactly window_secs old and no longer retained;
        // only t=1 counts
        assert!(flow.classify("pool-1", SwapDirection::AtoB, 30));
    }

    #[test]
    fn test_pools_are_independent() {
        let mut flow = classifier();
        flow.classify("pool-1", SwapDirection::AtoB, 0);
        flow.classify("pool-1", SwapDirection::AtoB, 1);
        assert!(!flow.classify("pool-1", SwapDirection::AtoB, 2));
        assert!(flow.classify("pool-2", SwapDirection::AtoB, 2));
        assert_eq!(flow.pool_count(), 2);
    }

    #[test]
    fn test_history_capacity_bound() {
        let mut config = StrategyConfig::default();
        config.flow_window_secs = 1_000_000;
        config.max_same_direction_events = 100;
        let mut flow = FlowClassifier::new(&config);

        for t in 0..25 {
            flow.classify("pool-1", SwapDirection::AtoB, t);
        }
        // Only the 10 most recent records survive, so the same-direction
        // count stays at 10 and the verdict remains isolated
        assert!(flow.classify("pool-1", SwapDirection::AtoB, 25));
        assert_eq!(
            flow.history.get("pool-1").map(|h| h.len()),
            Some(HISTORY_CAPACITY)
        );
    }
}
