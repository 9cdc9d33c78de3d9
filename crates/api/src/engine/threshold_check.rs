//! Threshold checking for a freshly stored report.
//!
//! For every metric of the report:
//!
//! 1. load the thresholds of the metric's measure (through the TTL cache)
//!    and keep those whose branch/testbed scope matches the report;
//! 2. fetch the most recent `min_sample_size` values of the same
//!    benchmark/measure/branch/testbed series from earlier reports;
//! 3. run the evaluator;
//! 4. store an `active` alert for each violation.
//!
//! Metrics are evaluated concurrently, bounded by `evaluation_concurrency`.

use std::sync::Arc;

use driftwatch_core::threshold::evaluate;
use driftwatch_core::types::DbId;
use driftwatch_db::models::alert::{Alert, CreateAlert};
use driftwatch_db::models::metric::{BaselineKey, Metric};
use driftwatch_db::models::report::Report;
use driftwatch_db::models::threshold::Threshold;
use driftwatch_db::repositories::{AlertRepo, MetricRepo, ThresholdRepo};
use futures::stream::{self, StreamExt, TryStreamExt};

use crate::error::AppResult;
use crate::state::AppState;

/// Cache key for the thresholds of one measure.
pub fn measure_cache_key(project_id: DbId, measure_id: DbId) -> String {
    format!("project:{project_id}:measure:{measure_id}")
}

/// Prefix shared by every cache key of a project.
pub fn project_cache_prefix(project_id: DbId) -> String {
    format!("project:{project_id}:")
}

/// Drop every cached threshold list of a project.
pub async fn invalidate_project(state: &AppState, project_id: DbId) {
    state
        .threshold_cache
        .invalidate_prefix(&project_cache_prefix(project_id))
        .await;
    tracing::debug!(project_id, "Threshold cache invalidated");
}

/// Thresholds defined on a measure, from cache or database.
///
/// A list read while a threshold change is being invalidated is used for
/// this report only and never cached.
pub async fn thresholds_for_measure(
    state: &AppState,
    project_id: DbId,
    measure_id: DbId,
) -> Result<Arc<Vec<Threshold>>, sqlx::Error> {
    let key = measure_cache_key(project_id, measure_id);
    state
        .threshold_cache
        .get_or_load(&key, || async {
            ThresholdRepo::list_for_measure(&state.pool, project_id, measure_id)
                .await
                .map(Arc::new)
        })
        .await
}

/// Check every metric of `report` and return the alerts created, ordered by id.
pub async fn check_report(
    state: &AppState,
    report: &Report,
    metrics: &[Metric],
) -> AppResult<Vec<Alert>> {
    let checks: Vec<_> = metrics
        .iter()
        .map(|metric| check_metric(state, report, metric))
        .collect();
    let per_metric: Vec<Vec<Alert>> = stream::iter(checks)
        .buffer_unordered(state.config.evaluation_concurrency)
        .try_collect()
        .await?;

    let mut alerts: Vec<Alert> = per_metric.into_iter().flatten().collect();
    alerts.sort_by_key(|a| a.id);

    tracing::info!(
        project_id = report.project_id,
        report_id = report.id,
        metric_count = metrics.len(),
        alert_count = alerts.len(),
        "Report evaluated"
    );
    Ok(alerts)
}

async fn check_metric(state: &AppState, report: &Report, metric: &Metric) -> AppResult<Vec<Alert>> {
    let thresholds = thresholds_for_measure(state, report.project_id, metric.measure_id).await?;
    let mut alerts = Vec::new();

    let applicable = thresholds
        .iter()
        .filter(|t| t.scope().applies_to(report.branch_id, report.testbed_id));

    for threshold in applicable {
        let config = match threshold.config() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(threshold_id = threshold.id, error = %e, "Skipping invalid threshold");
                continue;
            }
        };

        let key = BaselineKey {
            benchmark_id: metric.benchmark_id,
            measure_id: metric.measure_id,
            branch_id: report.branch_id,
            testbed_id: report.testbed_id,
        };
        let baseline = MetricRepo::baseline_values(
            &state.pool,
            &key,
            report.id,
            i64::from(config.min_sample_size.get()),
        )
        .await?;

        let violation = match evaluate(&config, metric.value, &baseline) {
            Ok(Some(violation)) => violation,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(
                    threshold_id = threshold.id,
                    metric_id = metric.id,
                    error = %e,
                    "Threshold evaluation skipped"
                );
                continue;
            }
        };

        tracing::info!(
            project_id = report.project_id,
            report_id = report.id,
            metric_id = metric.id,
            threshold_id = threshold.id,
            kind = violation.kind.as_str(),
            value = metric.value,
            baseline = violation.baseline_value,
            percent_change = violation.percent_change,
            "Threshold violated"
        );

        let alert = AlertRepo::create(
            &state.pool,
            &CreateAlert {
                threshold_id: threshold.id,
                metric_id: metric.id,
                current_value: metric.value,
                violation,
            },
        )
        .await?;
        alerts.push(alert);
    }

    Ok(alerts)
}
