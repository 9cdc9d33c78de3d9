use std::sync::Arc;

use driftwatch_core::cache::TtlCache;
use driftwatch_db::models::threshold::Threshold;

use crate::config::ServerConfig;

/// Thresholds of one measure, keyed by `project:{p}:measure:{m}`.
pub type ThresholdCache = TtlCache<Arc<Vec<Threshold>>>;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: driftwatch_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Threshold lookups for report evaluation.
    pub threshold_cache: Arc<ThresholdCache>,
}

impl AppState {
    pub fn new(pool: driftwatch_db::DbPool, config: ServerConfig) -> Self {
        let threshold_cache = Arc::new(TtlCache::new(
            config.threshold_cache_ttl(),
            config.threshold_cache_max_entries,
        ));
        Self {
            pool,
            config: Arc::new(config),
            threshold_cache,
        }
    }
}
