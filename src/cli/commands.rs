//! CLI command implementations

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::strategy::{Clock, FadeEngine};
use crate::stream::{EventSource, ReplaySource};

/// Run the fade engine over an event source until it is exhausted.
pub async fn start(
    config: &Config,
    replay: Option<String>,
    max_events: Option<u64>,
) -> Result<()> {
    let replay_path = replay
        .or_else(|| config.stream.replay_path.clone())
        .context("no event source configured: pass --replay or set stream.replay_path")?;
    let max_events = max_events.or(config.stream.max_events);

    info!("Fade engine initialized. Listening for pool events...");
    info!(
        min_impact_bp = config.strategy.min_impact_bp,
        max_impact_bp = config.strategy.max_impact_bp,
        wait_time_secs = config.strategy.wait_time_secs,
        max_position_size_ratio = config.strategy.max_position_size_ratio,
        "strategy parameters"
    );

    let mut source = ReplaySource::open(&replay_path)
        .await
        .context("failed to open replay source")?;
    let mut engine = FadeEngine::new(&config.strategy);

    let processed = run_loop(&mut engine, &mut source, max_events).await?;

    info!(
        processed,
        signals = engine.signals_emitted(),
        active_positions = engine.registry().active_count(),
        "event stream ended"
    );
    for position in engine.drain_positions() {
        info!(pool_id = %position.pool_id, position = %position, status = ?position.status, "position open at shutdown");
    }

    Ok(())
}

/// Pull events one at a time and run each fully through the engine before
/// the next; per-pool state relies on this ordering.
async fn run_loop<C: Clock, S: EventSource>(
    engine: &mut FadeEngine<C>,
    source: &mut S,
    max_events: Option<u64>,
) -> Result<u64> {
    let mut processed = 0u64;

    while let Some(batch) = source.next_batch().await? {
        for event in &batch {
            engine.process(event);
            processed += 1;

            if let Some(limit) = max_events {
                if processed >= limit {
                    info!(limit, "event limit reached");
                    return Ok(processed);
                }
            }
        }
    }

    Ok(processed)
}

/// Print the effective configuration
pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", config.display());
    Ok(())
}
