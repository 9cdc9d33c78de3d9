//! Periodic maintenance of the threshold cache.
//!
//! Reads already skip expired entries; the sweeper applies expirations and
//! pending invalidations so entries for measures that stop reporting do not
//! linger until capacity eviction.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::state::ThresholdCache;

/// Run the sweep loop until `cancel` is triggered.
pub async fn run(cache: Arc<ThresholdCache>, every: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = every.as_secs(), "Cache sweeper started");

    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Cache sweeper stopping");
                break;
            }
            _ = interval.tick() => {
                cache.run_pending_tasks().await;
                tracing::debug!(entries = cache.entry_count(), "Cache sweep complete");
            }
        }
    }
}
