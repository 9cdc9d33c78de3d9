//! Repository for the `metrics` table.

use driftwatch_core::report::MetricInput;
use driftwatch_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::metric::{BaselineKey, Metric, MetricHistoryFilter, MetricHistoryPoint};

/// Column list for `metrics` queries.
const COLUMNS: &str = "\
    id, report_id, benchmark_id, measure_id, \
    value, lower_value, upper_value, created_at";

/// Provides query operations for metrics.
pub struct MetricRepo;

impl MetricRepo {
    /// Most recent values of a series recorded by reports older than
    /// `before_report_id`, newest first, at most `limit` of them.
    pub async fn baseline_values(
        pool: &PgPool,
        key: &BaselineKey,
        before_report_id: DbId,
        limit: i64,
    ) -> Result<Vec<f64>, sqlx::Error> {
        sqlx::query_scalar::<_, f64>(
            "SELECT m.value FROM metrics m \
             JOIN reports r ON r.id = m.report_id \
             WHERE m.benchmark_id = $1 AND m.measure_id = $2 \
               AND r.branch_id = $3 AND r.testbed_id = $4 \
               AND m.report_id < $5 \
             ORDER BY m.created_at DESC, m.id DESC \
             LIMIT $6",
        )
        .bind(key.benchmark_id)
        .bind(key.measure_id)
        .bind(key.branch_id)
        .bind(key.testbed_id)
        .bind(before_report_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub async fn list_for_report(pool: &PgPool, report_id: DbId) -> Result<Vec<Metric>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM metrics WHERE report_id = $1 ORDER BY id");
        sqlx::query_as::<_, Metric>(&query)
            .bind(report_id)
            .fetch_all(pool)
            .await
    }

    /// Trend points for a project, newest first. Unset filter fields match all.
    pub async fn history(
        pool: &PgPool,
        project_id: DbId,
        filter: &MetricHistoryFilter,
        limit: i64,
    ) -> Result<Vec<MetricHistoryPoint>, sqlx::Error> {
        sqlx::query_as::<_, MetricHistoryPoint>(
            "SELECT m.id AS metric_id, m.report_id, m.benchmark_id, m.measure_id, \
                    r.branch_id, r.testbed_id, \
                    m.value, m.lower_value, m.upper_value, r.git_hash, m.created_at \
             FROM metrics m \
             JOIN reports r ON r.id = m.report_id \
             WHERE r.project_id = $1 \
               AND ($2::BIGINT IS NULL OR m.benchmark_id = $2) \
               AND ($3::BIGINT IS NULL OR m.measure_id = $3) \
               AND ($4::BIGINT IS NULL OR r.branch_id = $4) \
               AND ($5::BIGINT IS NULL OR r.testbed_id = $5) \
             ORDER BY m.created_at DESC, m.id DESC \
             LIMIT $6",
        )
        .bind(project_id)
        .bind(filter.benchmark_id)
        .bind(filter.measure_id)
        .bind(filter.branch_id)
        .bind(filter.testbed_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}

/// Insert one metric on the report's transaction.
pub(crate) async fn insert_metric(
    conn: &mut PgConnection,
    report_id: DbId,
    benchmark_id: DbId,
    measure_id: DbId,
    input: &MetricInput,
) -> Result<Metric, sqlx::Error> {
    let query = format!(
        "INSERT INTO metrics (report_id, benchmark_id, measure_id, value, lower_value, upper_value) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, Metric>(&query)
        .bind(report_id)
        .bind(benchmark_id)
        .bind(measure_id)
        .bind(input.value)
        .bind(input.lower_value)
        .bind(input.upper_value)
        .fetch_one(&mut *conn)
        .await
}
