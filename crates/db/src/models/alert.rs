//! Alert entity model and DTOs.

use driftwatch_core::alert::AlertStatus;
use driftwatch_core::threshold::ThresholdViolation;
use driftwatch_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An alert row from the `alerts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Alert {
    pub id: DbId,
    pub threshold_id: DbId,
    pub metric_id: DbId,
    pub status: String,
    pub kind: String,
    pub baseline_value: f64,
    pub percent_change: f64,
    pub current_value: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An alert joined with the names of what it is about, for list views.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AlertSummary {
    pub id: DbId,
    pub threshold_id: DbId,
    pub metric_id: DbId,
    pub report_id: DbId,
    pub status: String,
    pub kind: String,
    pub baseline_value: f64,
    pub percent_change: f64,
    pub current_value: f64,
    pub benchmark: String,
    pub measure: String,
    pub branch: String,
    pub testbed: String,
    pub git_hash: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert shape for a new `active` alert.
#[derive(Debug, Clone)]
pub struct CreateAlert {
    pub threshold_id: DbId,
    pub metric_id: DbId,
    pub current_value: f64,
    pub violation: ThresholdViolation,
}

/// DTO for an alert status change.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAlertStatus {
    pub status: AlertStatus,
}
