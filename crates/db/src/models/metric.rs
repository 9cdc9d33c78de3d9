//! Metric entity model and query shapes.

use driftwatch_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single recorded value (append-only).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Metric {
    pub id: DbId,
    pub report_id: DbId,
    pub benchmark_id: DbId,
    pub measure_id: DbId,
    pub value: f64,
    pub lower_value: Option<f64>,
    pub upper_value: Option<f64>,
    pub created_at: Timestamp,
}

/// Identifies the series a baseline is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaselineKey {
    pub benchmark_id: DbId,
    pub measure_id: DbId,
    pub branch_id: DbId,
    pub testbed_id: DbId,
}

/// Filters for the metric history (trend) query. All optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricHistoryFilter {
    pub benchmark_id: Option<DbId>,
    pub measure_id: Option<DbId>,
    pub branch_id: Option<DbId>,
    pub testbed_id: Option<DbId>,
    pub limit: Option<i64>,
}

/// One point of a metric trend, with its report context.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MetricHistoryPoint {
    pub metric_id: DbId,
    pub report_id: DbId,
    pub benchmark_id: DbId,
    pub measure_id: DbId,
    pub branch_id: DbId,
    pub testbed_id: DbId,
    pub value: f64,
    pub lower_value: Option<f64>,
    pub upper_value: Option<f64>,
    pub git_hash: Option<String>,
    pub created_at: Timestamp,
}
