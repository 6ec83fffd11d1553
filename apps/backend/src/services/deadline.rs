//! Shared low-frequency sweep that resolves stalled matches.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::services::match_registry::MatchRegistry;

/// Spawn the sweeper. It ticks every `period` until `cancel` fires.
pub fn spawn_deadline_sweeper(
    registry: Arc<MatchRegistry>,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(period_ms = period.as_millis() as u64, "deadline sweeper started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    registry.sweep();
                }
            }
        }
        info!("deadline sweeper stopped");
    })
}
