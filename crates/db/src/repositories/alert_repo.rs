//! Repository for the `alerts` table.

use driftwatch_core::alert::AlertStatus;
use driftwatch_core::types::DbId;
use sqlx::PgPool;

use crate::models::alert::{Alert, AlertSummary, CreateAlert};

/// Column list for `alerts` queries.
const COLUMNS: &str = "\
    id, threshold_id, metric_id, status, kind, \
    baseline_value, percent_change, current_value, created_at, updated_at";

/// Joined select for [`AlertSummary`] rows; callers append WHERE/ORDER.
const SUMMARY_SELECT: &str = "\
    SELECT a.id, a.threshold_id, a.metric_id, m.report_id, a.status, a.kind, \
           a.baseline_value, a.percent_change, a.current_value, \
           b.name AS benchmark, ms.name AS measure, \
           br.name AS branch, tb.name AS testbed, r.git_hash, \
           a.created_at, a.updated_at \
    FROM alerts a \
    JOIN metrics m ON m.id = a.metric_id \
    JOIN reports r ON r.id = m.report_id \
    JOIN benchmarks b ON b.id = m.benchmark_id \
    JOIN measures ms ON ms.id = m.measure_id \
    JOIN branches br ON br.id = r.branch_id \
    JOIN testbeds tb ON tb.id = r.testbed_id";

/// Provides query operations for alerts.
pub struct AlertRepo;

impl AlertRepo {
    /// Insert a new `active` alert.
    pub async fn create(pool: &PgPool, input: &CreateAlert) -> Result<Alert, sqlx::Error> {
        let query = format!(
            "INSERT INTO alerts \
                (threshold_id, metric_id, kind, baseline_value, percent_change, current_value) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(input.threshold_id)
            .bind(input.metric_id)
            .bind(input.violation.kind.as_str())
            .bind(input.violation.baseline_value)
            .bind(input.violation.percent_change)
            .bind(input.current_value)
            .fetch_one(pool)
            .await
    }

    /// Find an alert belonging to a project.
    pub async fn find_by_id(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<AlertSummary>, sqlx::Error> {
        let query = format!("{SUMMARY_SELECT} WHERE a.id = $1 AND r.project_id = $2");
        sqlx::query_as::<_, AlertSummary>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's alerts, newest first, optionally by status.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
        status: Option<AlertStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AlertSummary>, sqlx::Error> {
        let query = format!(
            "{SUMMARY_SELECT} \
             WHERE r.project_id = $1 AND ($2::TEXT IS NULL OR a.status = $2) \
             ORDER BY a.created_at DESC, a.id DESC \
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, AlertSummary>(&query)
            .bind(project_id)
            .bind(status.map(AlertStatus::as_str))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn list_for_report(
        pool: &PgPool,
        report_id: DbId,
    ) -> Result<Vec<AlertSummary>, sqlx::Error> {
        let query = format!("{SUMMARY_SELECT} WHERE m.report_id = $1 ORDER BY a.id");
        sqlx::query_as::<_, AlertSummary>(&query)
            .bind(report_id)
            .fetch_all(pool)
            .await
    }

    /// Move an alert from `from` to `to`.
    ///
    /// Returns `None` when the alert no longer has status `from`, so two
    /// concurrent transitions cannot both succeed.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        from: AlertStatus,
        to: AlertStatus,
    ) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!(
            "UPDATE alerts SET status = $3, updated_at = NOW() \
             WHERE id = $1 AND status = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(id)
            .bind(from.as_str())
            .bind(to.as_str())
            .fetch_optional(pool)
            .await
    }
}
