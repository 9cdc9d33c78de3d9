//! Threshold entity model and DTOs.

use driftwatch_core::error::CoreError;
use driftwatch_core::threshold::{ThresholdConfig, ThresholdScope, DEFAULT_MIN_SAMPLE_SIZE};
use driftwatch_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A threshold row from the `thresholds` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Threshold {
    pub id: DbId,
    pub project_id: DbId,
    pub measure_id: DbId,
    pub branch_id: Option<DbId>,
    pub testbed_id: Option<DbId>,
    pub upper_boundary: Option<f64>,
    pub lower_boundary: Option<f64>,
    pub min_sample_size: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Threshold {
    /// Evaluator configuration for this row.
    pub fn config(&self) -> Result<ThresholdConfig, CoreError> {
        ThresholdConfig::new(
            self.upper_boundary,
            self.lower_boundary,
            sample_size_from_i32(self.min_sample_size)?,
        )
    }

    pub fn scope(&self) -> ThresholdScope {
        ThresholdScope {
            branch_id: self.branch_id,
            testbed_id: self.testbed_id,
        }
    }
}

/// DTO for creating a threshold. A `None` branch or testbed matches all.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateThreshold {
    pub measure_id: DbId,
    pub branch_id: Option<DbId>,
    pub testbed_id: Option<DbId>,
    pub upper_boundary: Option<f64>,
    pub lower_boundary: Option<f64>,
    pub min_sample_size: Option<i32>,
}

impl CreateThreshold {
    pub fn config(&self) -> Result<ThresholdConfig, CoreError> {
        let min_sample_size = match self.min_sample_size {
            Some(n) => sample_size_from_i32(n)?,
            None => DEFAULT_MIN_SAMPLE_SIZE,
        };
        ThresholdConfig::new(self.upper_boundary, self.lower_boundary, min_sample_size)
    }

    pub fn scope(&self) -> ThresholdScope {
        ThresholdScope {
            branch_id: self.branch_id,
            testbed_id: self.testbed_id,
        }
    }
}

/// DTO for updating a threshold. Omitted fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateThreshold {
    pub upper_boundary: Option<f64>,
    pub lower_boundary: Option<f64>,
    pub min_sample_size: Option<i32>,
}

impl UpdateThreshold {
    /// Merge this patch over `current` and validate the result.
    pub fn apply_to(&self, current: &Threshold) -> Result<ThresholdConfig, CoreError> {
        let min_sample_size = self.min_sample_size.unwrap_or(current.min_sample_size);
        ThresholdConfig::new(
            self.upper_boundary.or(current.upper_boundary),
            self.lower_boundary.or(current.lower_boundary),
            sample_size_from_i32(min_sample_size)?,
        )
    }
}

fn sample_size_from_i32(n: i32) -> Result<u32, CoreError> {
    u32::try_from(n).map_err(|_| {
        CoreError::Validation(format!("min_sample_size must be at least 1, got {n}"))
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn row() -> Threshold {
        Threshold {
            id: 1,
            project_id: 1,
            measure_id: 1,
            branch_id: Some(3),
            testbed_id: None,
            upper_boundary: Some(10.0),
            lower_boundary: None,
            min_sample_size: 5,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn create_defaults_min_sample_size() {
        let input = CreateThreshold {
            measure_id: 1,
            branch_id: None,
            testbed_id: None,
            upper_boundary: Some(5.0),
            lower_boundary: None,
            min_sample_size: None,
        };
        assert_eq!(input.config().unwrap().min_sample_size.get(), DEFAULT_MIN_SAMPLE_SIZE);
    }

    #[test]
    fn create_rejects_negative_sample_size() {
        let input = CreateThreshold {
            measure_id: 1,
            branch_id: None,
            testbed_id: None,
            upper_boundary: Some(5.0),
            lower_boundary: None,
            min_sample_size: Some(-1),
        };
        assert!(input.config().is_err());
    }

    #[test]
    fn update_merges_over_current() {
        let patch = UpdateThreshold {
            lower_boundary: Some(20.0),
            ..Default::default()
        };
        let config = patch.apply_to(&row()).unwrap();
        assert_eq!(config.upper_boundary, Some(10.0));
        assert_eq!(config.lower_boundary, Some(20.0));
        assert_eq!(config.min_sample_size.get(), 5);
    }

    #[test]
    fn update_rejects_invalid_merge() {
        let patch = UpdateThreshold {
            upper_boundary: Some(-1.0),
            ..Default::default()
        };
        assert!(patch.apply_to(&row()).is_err());
    }

    #[test]
    fn scope_reflects_row() {
        let scope = row().scope();
        assert!(scope.applies_to(3, 99));
        assert!(!scope.applies_to(4, 99));
    }
}
