//! Threshold evaluation for benchmark regressions.
//!
//! A threshold compares a newly reported metric value against the mean of a
//! window of prior baseline values. When the percent change from that mean
//! crosses the configured upper or lower boundary, [`evaluate`] returns a
//! [`ThresholdViolation`] which the caller persists as an alert.
//!
//! The evaluator is pure: no I/O, no shared state, safe to call from any
//! number of tasks at once.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Minimum baseline sample count applied when a threshold omits it.
pub const DEFAULT_MIN_SAMPLE_SIZE: u32 = 2;

/// Upper bound on `min_sample_size`; also caps the baseline window query.
pub const MAX_MIN_SAMPLE_SIZE: u32 = 1000;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Boundaries and sample gate for one monitored measure.
///
/// Boundaries are percent magnitudes: `upper_boundary = 10.0` fires when the
/// new value is more than 10% above the baseline mean, `lower_boundary = 10.0`
/// fires when it is more than 10% below.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub upper_boundary: Option<f64>,
    pub lower_boundary: Option<f64>,
    pub min_sample_size: NonZeroU32,
}

impl ThresholdConfig {
    /// Build a validated configuration.
    ///
    /// Rejects a zero sample size in addition to everything
    /// [`ThresholdConfig::validate`] checks.
    pub fn new(
        upper_boundary: Option<f64>,
        lower_boundary: Option<f64>,
        min_sample_size: u32,
    ) -> Result<Self, CoreError> {
        let min_sample_size = NonZeroU32::new(min_sample_size).ok_or_else(|| {
            CoreError::Validation("min_sample_size must be at least 1".to_string())
        })?;
        let config = Self {
            upper_boundary,
            lower_boundary,
            min_sample_size,
        };
        config.validate()?;
        Ok(config)
    }

    /// Creation-time checks for a threshold configuration.
    ///
    /// [`evaluate`] never calls this; a configuration with no boundary simply
    /// never fires there.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.upper_boundary.is_none() && self.lower_boundary.is_none() {
            return Err(CoreError::Validation(
                "at least one of upper_boundary or lower_boundary must be set".to_string(),
            ));
        }
        if let Some(upper) = self.upper_boundary {
            validate_boundary(upper, "upper_boundary")?;
        }
        if let Some(lower) = self.lower_boundary {
            validate_boundary(lower, "lower_boundary")?;
        }
        if self.min_sample_size.get() > MAX_MIN_SAMPLE_SIZE {
            return Err(CoreError::Validation(format!(
                "min_sample_size must be at most {MAX_MIN_SAMPLE_SIZE}, got {}",
                self.min_sample_size
            )));
        }
        Ok(())
    }
}

fn validate_boundary(value: f64, name: &str) -> Result<(), CoreError> {
    if !value.is_finite() || value < 0.0 {
        return Err(CoreError::Validation(format!(
            "{name} must be a finite, non-negative percentage, got {value}"
        )));
    }
    Ok(())
}

/// Branch/testbed scope of a threshold. `None` matches any id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThresholdScope {
    pub branch_id: Option<DbId>,
    pub testbed_id: Option<DbId>,
}

impl ThresholdScope {
    /// Whether a threshold with this scope monitors the given branch/testbed.
    pub fn applies_to(&self, branch_id: DbId, testbed_id: DbId) -> bool {
        self.branch_id.map_or(true, |id| id == branch_id)
            && self.testbed_id.map_or(true, |id| id == testbed_id)
    }
}

// ---------------------------------------------------------------------------
// Evaluation result
// ---------------------------------------------------------------------------

/// Direction of a threshold violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationKind {
    /// The value increased beyond `upper_boundary`.
    Upper,
    /// The value decreased beyond `lower_boundary`.
    Lower,
}

impl ViolationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upper => "upper",
            Self::Lower => "lower",
        }
    }

    /// Parse the stored text form.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "upper" => Ok(Self::Upper),
            "lower" => Ok(Self::Lower),
            other => Err(CoreError::Validation(format!(
                "Unknown violation kind: '{other}'"
            ))),
        }
    }
}

/// A detected threshold violation. Ephemeral until the caller stores it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdViolation {
    /// Arithmetic mean of the baseline window.
    pub baseline_value: f64,
    /// Signed percent difference of the new value from `baseline_value`.
    pub percent_change: f64,
    #[serde(rename = "type")]
    pub kind: ViolationKind,
}

/// Inputs the evaluator refuses to classify.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("new value must be finite, got {0}")]
    NonFiniteValue(f64),

    #[error("baseline value at position {index} is not finite")]
    NonFiniteBaseline { index: usize },

    #[error("percent change is not representable for baseline mean {baseline}")]
    Overflow { baseline: f64 },
}

impl From<EvaluationError> for CoreError {
    fn from(err: EvaluationError) -> Self {
        CoreError::Validation(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Arithmetic mean of `values`, or `None` when empty.
pub fn baseline_mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Signed percent change of `new_value` relative to `baseline`.
pub fn percent_change(new_value: f64, baseline: f64) -> f64 {
    ((new_value - baseline) / baseline) * 100.0
}

/// Decide whether `new_value` violates `config` given the baseline window.
///
/// Returns `Ok(None)` when there are fewer than `min_sample_size` baseline
/// values, when the baseline mean is zero, or when the percent change stays
/// within the boundaries. Boundary comparisons are strict, and the upper
/// boundary is checked before the lower one.
///
/// Non-finite input is rejected rather than guessed at: a NaN or infinite
/// `new_value` fails before the sample gate, a non-finite baseline entry
/// fails once the gate has passed, and a mean or percent change that
/// overflows to infinity is [`EvaluationError::Overflow`].
pub fn evaluate(
    config: &ThresholdConfig,
    new_value: f64,
    baseline_values: &[f64],
) -> Result<Option<ThresholdViolation>, EvaluationError> {
    if !new_value.is_finite() {
        return Err(EvaluationError::NonFiniteValue(new_value));
    }
    if baseline_values.len() < config.min_sample_size.get() as usize {
        return Ok(None);
    }
    if let Some(index) = baseline_values.iter().position(|v| !v.is_finite()) {
        return Err(EvaluationError::NonFiniteBaseline { index });
    }

    let Some(baseline) = baseline_mean(baseline_values) else {
        return Ok(None);
    };
    if !baseline.is_finite() {
        return Err(EvaluationError::Overflow { baseline });
    }
    if baseline == 0.0 {
        return Ok(None);
    }

    let change = percent_change(new_value, baseline);
    if !change.is_finite() {
        return Err(EvaluationError::Overflow { baseline });
    }

    let kind = if config.upper_boundary.is_some_and(|upper| change > upper) {
        ViolationKind::Upper
    } else if config.lower_boundary.is_some_and(|lower| change < -lower) {
        ViolationKind::Lower
    } else {
        return Ok(None);
    };

    Ok(Some(ThresholdViolation {
        baseline_value: baseline,
        percent_change: change,
        kind,
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn upper(boundary: f64, min: u32) -> ThresholdConfig {
        ThresholdConfig::new(Some(boundary), None, min).unwrap()
    }

    fn lower(boundary: f64, min: u32) -> ThresholdConfig {
        ThresholdConfig::new(None, Some(boundary), min).unwrap()
    }

    // -- evaluate: reference scenarios ----------------------------------------

    #[test]
    fn large_increase_fires_upper() {
        let v = evaluate(&upper(10.0, 2), 150.0, &[100.0, 100.0])
            .unwrap()
            .unwrap();
        assert_eq!(v.kind, ViolationKind::Upper);
        assert_eq!(v.baseline_value, 100.0);
        assert!((v.percent_change - 50.0).abs() < 1e-9);
    }

    #[test]
    fn increase_within_boundary_is_quiet() {
        assert_eq!(evaluate(&upper(50.0, 2), 120.0, &[100.0, 100.0]), Ok(None));
    }

    #[test]
    fn insufficient_samples_is_quiet() {
        assert_eq!(evaluate(&upper(10.0, 5), 500.0, &[100.0]), Ok(None));
    }

    #[test]
    fn large_decrease_fires_lower() {
        let v = evaluate(&lower(20.0, 2), 50.0, &[100.0, 100.0])
            .unwrap()
            .unwrap();
        assert_eq!(v.kind, ViolationKind::Lower);
        assert!((v.percent_change + 50.0).abs() < 1e-9);
    }

    #[test]
    fn zero_mean_baseline_is_quiet() {
        assert_eq!(evaluate(&upper(10.0, 2), 100.0, &[0.0, 0.0]), Ok(None));
    }

    #[test]
    fn zero_mean_from_mixed_signs_is_quiet() {
        assert_eq!(evaluate(&upper(10.0, 2), 100.0, &[-5.0, 5.0]), Ok(None));
    }

    // -- evaluate: boundaries -------------------------------------------------

    #[test]
    fn change_equal_to_upper_boundary_is_quiet() {
        assert_eq!(evaluate(&upper(10.0, 2), 110.0, &[100.0, 100.0]), Ok(None));
    }

    #[test]
    fn change_just_past_upper_boundary_fires() {
        let v = evaluate(&upper(10.0, 2), 110.001, &[100.0, 100.0]).unwrap();
        assert_matches!(v, Some(ThresholdViolation { kind: ViolationKind::Upper, .. }));
    }

    #[test]
    fn change_equal_to_lower_boundary_is_quiet() {
        assert_eq!(evaluate(&lower(20.0, 2), 80.0, &[100.0, 100.0]), Ok(None));
    }

    #[test]
    fn upper_only_ignores_decrease() {
        assert_eq!(evaluate(&upper(10.0, 2), 1.0, &[100.0, 100.0]), Ok(None));
    }

    #[test]
    fn lower_only_ignores_increase() {
        assert_eq!(evaluate(&lower(10.0, 2), 1000.0, &[100.0, 100.0]), Ok(None));
    }

    #[test]
    fn zero_upper_boundary_fires_on_any_increase() {
        let v = evaluate(&upper(0.0, 1), 100.5, &[100.0]).unwrap();
        assert_matches!(v, Some(ThresholdViolation { kind: ViolationKind::Upper, .. }));
    }

    #[test]
    fn config_without_boundaries_never_fires() {
        let config = ThresholdConfig {
            upper_boundary: None,
            lower_boundary: None,
            min_sample_size: NonZeroU32::MIN,
        };
        assert_eq!(evaluate(&config, 1e9, &[1.0]), Ok(None));
        assert_eq!(evaluate(&config, -1e9, &[1.0]), Ok(None));
    }

    #[test]
    fn mean_uses_every_supplied_value() {
        let v = evaluate(&upper(10.0, 2), 150.0, &[50.0, 100.0, 150.0])
            .unwrap()
            .unwrap();
        assert_eq!(v.baseline_value, 100.0);
    }

    // -- evaluate: non-finite input -------------------------------------------

    #[test]
    fn nan_new_value_rejected() {
        assert_matches!(
            evaluate(&upper(10.0, 2), f64::NAN, &[100.0, 100.0]),
            Err(EvaluationError::NonFiniteValue(_))
        );
    }

    #[test]
    fn infinite_new_value_rejected_even_without_samples() {
        assert_matches!(
            evaluate(&upper(10.0, 2), f64::INFINITY, &[]),
            Err(EvaluationError::NonFiniteValue(_))
        );
    }

    #[test]
    fn non_finite_baseline_reports_position() {
        assert_eq!(
            evaluate(&upper(10.0, 2), 1.0, &[100.0, f64::NAN]),
            Err(EvaluationError::NonFiniteBaseline { index: 1 })
        );
    }

    #[test]
    fn overflowing_mean_rejected() {
        assert_matches!(
            evaluate(&upper(10.0, 2), 1.0, &[f64::MAX, f64::MAX]),
            Err(EvaluationError::Overflow { .. })
        );
    }

    #[test]
    fn overflowing_percent_change_rejected() {
        assert_matches!(
            evaluate(&upper(10.0, 1), f64::MAX, &[1e-300]),
            Err(EvaluationError::Overflow { .. })
        );
    }

    #[test]
    fn evaluation_error_maps_to_validation() {
        let err: CoreError = EvaluationError::NonFiniteValue(f64::NAN).into();
        assert_matches!(err, CoreError::Validation(_));
    }

    // -- ThresholdConfig validation -------------------------------------------

    #[test]
    fn config_requires_a_boundary() {
        assert_matches!(
            ThresholdConfig::new(None, None, 2),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn config_rejects_zero_sample_size() {
        assert_matches!(
            ThresholdConfig::new(Some(10.0), None, 0),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn config_rejects_oversized_sample_size() {
        assert!(ThresholdConfig::new(Some(10.0), None, MAX_MIN_SAMPLE_SIZE).is_ok());
        assert!(ThresholdConfig::new(Some(10.0), None, MAX_MIN_SAMPLE_SIZE + 1).is_err());
    }

    #[test]
    fn config_rejects_negative_or_non_finite_boundaries() {
        assert!(ThresholdConfig::new(Some(-1.0), None, 2).is_err());
        assert!(ThresholdConfig::new(None, Some(f64::NAN), 2).is_err());
        assert!(ThresholdConfig::new(Some(f64::INFINITY), None, 2).is_err());
    }

    #[test]
    fn config_accepts_both_boundaries() {
        let config = ThresholdConfig::new(Some(5.0), Some(15.0), DEFAULT_MIN_SAMPLE_SIZE).unwrap();
        assert_eq!(config.min_sample_size.get(), 2);
    }

    #[test]
    fn config_deserialize_rejects_zero_sample_size() {
        let json = r#"{"upper_boundary": 10.0, "lower_boundary": null, "min_sample_size": 0}"#;
        assert!(serde_json::from_str::<ThresholdConfig>(json).is_err());
    }

    // -- ThresholdScope -------------------------------------------------------

    #[test]
    fn wildcard_scope_matches_everything() {
        assert!(ThresholdScope::default().applies_to(1, 2));
    }

    #[test]
    fn branch_scope_matches_only_its_branch() {
        let scope = ThresholdScope {
            branch_id: Some(7),
            testbed_id: None,
        };
        assert!(scope.applies_to(7, 99));
        assert!(!scope.applies_to(8, 99));
    }

    #[test]
    fn full_scope_requires_both() {
        let scope = ThresholdScope {
            branch_id: Some(1),
            testbed_id: Some(2),
        };
        assert!(scope.applies_to(1, 2));
        assert!(!scope.applies_to(1, 3));
        assert!(!scope.applies_to(3, 2));
    }

    // -- Serialization --------------------------------------------------------

    #[test]
    fn violation_serializes_kind_as_type() {
        let v = ThresholdViolation {
            baseline_value: 100.0,
            percent_change: 50.0,
            kind: ViolationKind::Upper,
        };
        let json = serde_json::to_value(v).unwrap();
        assert_eq!(json["type"], "upper");
        assert_eq!(json["baseline_value"], 100.0);
    }

    #[test]
    fn violation_kind_round_trips_text() {
        assert_eq!(ViolationKind::parse("lower").unwrap(), ViolationKind::Lower);
        assert_eq!(ViolationKind::Upper.as_str(), "upper");
        assert!(ViolationKind::parse("sideways").is_err());
    }
}
