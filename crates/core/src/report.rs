//! Benchmark report submission: input shape, validation, and verdict.
//!
//! A report is one CI run on a (branch, testbed) pair carrying any number of
//! metric values, each naming the benchmark and measure it belongs to.
//! Validation here guarantees that every value handed to the threshold
//! evaluator is finite.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;

static GIT_HASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{7,40}$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// A single reported measurement, Criterion style: a point estimate with
/// optional confidence bounds.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MetricInput {
    #[validate(length(min = 1, max = 255))]
    pub benchmark: String,
    #[validate(length(min = 1, max = 255))]
    pub measure: String,
    pub value: f64,
    pub lower_value: Option<f64>,
    pub upper_value: Option<f64>,
}

/// A report as submitted by the CLI or CI integration.
///
/// Branch, testbed, benchmark and measure are referenced by name and are
/// created on first use.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReportSubmission {
    #[validate(length(min = 1, max = 255))]
    pub branch: String,
    #[validate(length(min = 1, max = 255))]
    pub testbed: String,
    pub git_hash: Option<String>,
    pub pr_number: Option<i32>,
    #[validate(length(min = 1, max = 10000))]
    pub metrics: Vec<MetricInput>,
}

/// Validate a report submission before anything is written.
pub fn validate_submission(submission: &ReportSubmission) -> Result<(), CoreError> {
    submission
        .validate()
        .map_err(|e| CoreError::Validation(e.to_string()))?;

    if let Some(hash) = &submission.git_hash {
        if !GIT_HASH_RE.is_match(hash) {
            return Err(CoreError::Validation(format!(
                "git_hash must be 7-40 hexadecimal characters, got '{hash}'"
            )));
        }
    }
    if let Some(pr) = submission.pr_number {
        if pr <= 0 {
            return Err(CoreError::Validation(format!(
                "pr_number must be positive, got {pr}"
            )));
        }
    }

    for (i, metric) in submission.metrics.iter().enumerate() {
        metric
            .validate()
            .map_err(|e| CoreError::Validation(format!("metrics[{i}]: {e}")))?;
        validate_metric_values(metric).map_err(|msg| {
            CoreError::Validation(format!(
                "metrics[{i}] ({} / {}): {msg}",
                metric.benchmark, metric.measure
            ))
        })?;
    }
    Ok(())
}

fn validate_metric_values(metric: &MetricInput) -> Result<(), String> {
    if !metric.value.is_finite() {
        return Err(format!("value must be finite, got {}", metric.value));
    }
    if let Some(lower) = metric.lower_value {
        if !lower.is_finite() {
            return Err(format!("lower_value must be finite, got {lower}"));
        }
        if lower > metric.value {
            return Err(format!(
                "lower_value ({lower}) must not exceed value ({})",
                metric.value
            ));
        }
    }
    if let Some(upper) = metric.upper_value {
        if !upper.is_finite() {
            return Err(format!("upper_value must be finite, got {upper}"));
        }
        if upper < metric.value {
            return Err(format!(
                "upper_value ({upper}) must not be below value ({})",
                metric.value
            ));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// Overall outcome of a report once its metrics have been checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictState {
    Passed,
    Regressed,
}

/// Summary attached to a submitted report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportVerdict {
    pub state: VerdictState,
    pub alert_count: usize,
    pub description: String,
}

impl ReportVerdict {
    pub fn from_alert_count(alert_count: usize) -> Self {
        if alert_count == 0 {
            return Self {
                state: VerdictState::Passed,
                alert_count,
                description: "All benchmarks passed".to_string(),
            };
        }
        let plural = if alert_count == 1 { "" } else { "s" };
        Self {
            state: VerdictState::Regressed,
            alert_count,
            description: format!("{alert_count} performance regression{plural} detected"),
        }
    }
}
