//! Repository for the `reports` table.

use std::collections::{BTreeMap, BTreeSet};

use driftwatch_core::report::ReportSubmission;
use driftwatch_core::types::DbId;
use sqlx::PgPool;

use crate::models::dimension::DimensionTable;
use crate::models::metric::Metric;
use crate::models::report::Report;
use crate::repositories::metric_repo;
use crate::repositories::DimensionRepo;

/// Column list for `reports` queries.
const COLUMNS: &str = "id, project_id, branch_id, testbed_id, git_hash, pr_number, created_at";

/// Provides query operations for reports.
pub struct ReportRepo;

impl ReportRepo {
    /// Store a validated submission and all of its metrics atomically.
    ///
    /// Branch, testbed, benchmark and measure names are resolved to ids
    /// (created on first use) inside the same transaction, always in the
    /// order branch, testbed, sorted benchmarks, sorted measures, so that
    /// concurrent reports naming the same rows cannot deadlock. Metrics are
    /// returned in submission order.
    pub async fn create_with_metrics(
        pool: &PgPool,
        project_id: DbId,
        submission: &ReportSubmission,
    ) -> Result<(Report, Vec<Metric>), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let branch_id =
            DimensionRepo::resolve_id(&mut *tx, DimensionTable::Branches, project_id, &submission.branch)
                .await?;
        let testbed_id = DimensionRepo::resolve_id(
            &mut *tx,
            DimensionTable::Testbeds,
            project_id,
            &submission.testbed,
        )
        .await?;

        let query = format!(
            "INSERT INTO reports (project_id, branch_id, testbed_id, git_hash, pr_number) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let report = sqlx::query_as::<_, Report>(&query)
            .bind(project_id)
            .bind(branch_id)
            .bind(testbed_id)
            .bind(&submission.git_hash)
            .bind(submission.pr_number)
            .fetch_one(&mut *tx)
            .await?;

        let benchmark_names: BTreeSet<&str> =
            submission.metrics.iter().map(|m| m.benchmark.as_str()).collect();
        let mut benchmark_ids: BTreeMap<&str, DbId> = BTreeMap::new();
        for name in benchmark_names {
            let id =
                DimensionRepo::resolve_id(&mut *tx, DimensionTable::Benchmarks, project_id, name)
                    .await?;
            benchmark_ids.insert(name, id);
        }

        let measure_names: BTreeSet<&str> =
            submission.metrics.iter().map(|m| m.measure.as_str()).collect();
        let mut measure_ids: BTreeMap<&str, DbId> = BTreeMap::new();
        for name in measure_names {
            let id = DimensionRepo::resolve_id(&mut *tx, DimensionTable::Measures, project_id, name)
                .await?;
            measure_ids.insert(name, id);
        }

        let mut metrics = Vec::with_capacity(submission.metrics.len());
        for input in &submission.metrics {
            let benchmark_id = benchmark_ids[input.benchmark.as_str()];
            let measure_id = measure_ids[input.measure.as_str()];
            let metric =
                metric_repo::insert_metric(&mut *tx, report.id, benchmark_id, measure_id, input)
                    .await?;
            metrics.push(metric);
        }

        tx.commit().await?;
        Ok((report, metrics))
    }

    pub async fn find_by_id(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<Report>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reports WHERE id = $1 AND project_id = $2");
        sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's reports, newest first.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Report>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reports WHERE project_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(project_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
