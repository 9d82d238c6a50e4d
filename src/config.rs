//! Configuration loading and validation

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub stream: StreamConfig,
}

/// Fade strategy parameters
#[derive(Debug, Clone, Deserialize)]
pub struct StrategyConfig {
    /// Minimum tier slippage to consider a move worth fading (basis points)
    #[serde(default = "default_min_impact_bp")]
    pub min_impact_bp: f64,
    /// Maximum tier slippage to fade; anything larger is too violent (basis points)
    #[serde(default = "default_max_impact_bp")]
    pub max_impact_bp: f64,
    /// Minimum swap-size / reserve ratio for a tier to be material
    #[serde(default = "default_min_liquidity_ratio")]
    pub min_liquidity_ratio: f64,
    /// Delay between signal creation and entry eligibility (seconds)
    #[serde(default = "default_wait_time_secs")]
    pub wait_time_secs: i64,
    /// Cap on position size as a fraction of the buy-side reserve
    #[serde(default = "default_max_position_size_ratio")]
    pub max_position_size_ratio: f64,
    /// Floor on position size, in human units of the bought currency
    #[serde(default = "default_min_position_size")]
    pub min_position_size: f64,
    /// Stop loss threshold (basis points of adverse move)
    #[serde(default = "default_stop_loss_bp")]
    pub stop_loss_bp: f64,
    /// Take profit threshold (basis points of favorable move)
    #[serde(default = "default_take_profit_bp")]
    pub take_profit_bp: f64,
    /// Lookback horizon for persistent-flow detection (seconds)
    #[serde(default = "default_flow_window_secs")]
    pub flow_window_secs: i64,
    /// Max recent same-direction events for a move to still count as isolated
    #[serde(default = "default_max_same_direction_events")]
    pub max_same_direction_events: usize,
}

/// Event source configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamConfig {
    /// Path to a JSONL file of raw messages to replay
    #[serde(default)]
    pub replay_path: Option<String>,
    /// Stop after this many events (unbounded when absent)
    #[serde(default)]
    pub max_events: Option<u64>,
}

fn default_min_impact_bp() -> f64 {
    50.0
}

fn default_max_impact_bp() -> f64 {
    500.0
}

fn default_min_liquidity_ratio() -> f64 {
    0.1
}

fn default_wait_time_secs() -> i64 {
    2
}

fn default_max_position_size_ratio() -> f64 {
    0.05
}

fn default_min_position_size() -> f64 {
    0.01
}

fn default_stop_loss_bp() -> f64 {
    100.0
}

fn default_take_profit_bp() -> f64 {
    50.0
}

fn default_flow_window_secs() -> i64 {
    30
}

fn default_max_same_direction_events() -> usize {
    1
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            min_impact_bp: default_min_impact_bp(),
            max_impact_bp: default_max_impact_bp(),
            min_liquidity_ratio: default_min_liquidity_ratio(),
            wait_time_secs: default_wait_time_secs(),
            max_position_size_ratio: default_max_position_size_ratio(),
            min_position_size: default_min_position_size(),
            stop_loss_bp: default_stop_loss_bp(),
            take_profit_bp: default_take_profit_bp(),
            flow_window_secs: default_flow_window_secs(),
            max_same_direction_events: default_max_same_direction_events(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strategy: StrategyConfig::default(),
            stream: StreamConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let settings = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::from(path).required(false))
            // Override with environment variables (prefix FADE_)
            .add_source(
                config::Environment::with_prefix("FADE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        let s = &self.strategy;

        if s.min_impact_bp < 0.0 {
            anyhow::bail!("min_impact_bp must not be negative");
        }

        if s.max_impact_bp < s.min_impact_bp {
            anyhow::bail!(
                "max_impact_bp ({}) must be >= min_impact_bp ({})",
                s.max_impact_bp,
                s.min_impact_bp
            );
        }

        if s.min_liquidity_ratio < 0.0 {
            anyhow::bail!("min_liquidity_ratio must not be negative");
        }

        if s.wait_time_secs < 0 {
            anyhow::bail!("wait_time_secs must not be negative");
        }

        if s.max_position_size_ratio <= 0.0 || s.max_position_size_ratio > 1.0 {
            anyhow::bail!("max_position_size_ratio must be in (0, 1]");
        }

        if s.min_position_size < 0.0 {
            anyhow::bail!("min_position_size must not be negative");
        }

        if s.stop_loss_bp <= 0.0 {
            anyhow::bail!("stop_loss_bp must be positive");
        }

        if s.take_profit_bp <= 0.0 {
            anyhow::bail!("take_profit_bp must be positive");
        }

        if s.flow_window_secs <= 0 {
            anyhow::bail!("flow_window_secs must be positive");
        }

        Ok(())
    }

    /// Get configuration summary for display
    pub fn display(&self) -> String {
        format!(
            r#"Configuration:
  Strategy:
    impact band: [{}, {}] bps
    min_liquidity_ratio: {}
    wait_time: {}s
    max_position_size_ratio: {}
    min_position_size: {}
    stop_loss: {} bps
    take_profit: {} bps
    flow_window: {}s
    max_same_direction_events: {}
  Stream:
    replay_path: {}
    max_events: {}
"#,
            self.strategy.min_impact_bp,
            self.strategy.max_impact_bp,
            self.strategy.min_liquidity_ratio,
            self.strategy.wait_time_secs,
            self.strategy.max_position_size_ratio,
            self.strategy.min_position_size,
            self.strategy.stop_loss_bp,
            self.strategy.take_profit_bp,
            self.strategy.flow_window_secs,
            self.strategy.max_same_direction_events,
            self.stream.replay_path.as_deref().unwrap_or("(none)"),
            self.stream
                .max_events
                .map(|n| n.to_string())
                .unwrap_or_else(|| "unbounded".to_string()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.strategy.min_impact_bp, 50.0);
        assert_eq!(config.strategy.max_impact_bp, 500.0);
        assert_eq!(config.strategy.max_same_direction_events, 1);
        assert_eq!(config.strategy.wait_time_secs, 2);
    }

    #[test]
    fn test_validate_rejects_inverted_band() {
        let mut config = Config::default();
        config.strategy.min_impact_bp = 600.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_ratio() {
        let mut config = Config::default();
        config.strategy.max_position_size_ratio = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_display_has_defaults() {
        let config = Config::default();
        let shown = config.display();
        assert!(shown.contains("[50, 500] bps"));
        assert!(shown.contains("flow_window: 30s"));
    }
}
