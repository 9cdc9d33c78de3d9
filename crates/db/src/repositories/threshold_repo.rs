//! Repository for the `thresholds` table.

use driftwatch_core::threshold::{ThresholdConfig, ThresholdScope};
use driftwatch_core::types::DbId;
use sqlx::PgPool;

use crate::models::threshold::Threshold;

/// Column list for `thresholds` queries.
const COLUMNS: &str = "\
    id, project_id, measure_id, branch_id, testbed_id, \
    upper_boundary, lower_boundary, min_sample_size, created_at, updated_at";

/// Provides CRUD operations for thresholds.
pub struct ThresholdRepo;

impl ThresholdRepo {
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        measure_id: DbId,
        scope: ThresholdScope,
        config: &ThresholdConfig,
    ) -> Result<Threshold, sqlx::Error> {
        let query = format!(
            "INSERT INTO thresholds \
                (project_id, measure_id, branch_id, testbed_id, \
                 upper_boundary, lower_boundary, min_sample_size) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Threshold>(&query)
            .bind(project_id)
            .bind(measure_id)
            .bind(scope.branch_id)
            .bind(scope.testbed_id)
            .bind(config.upper_boundary)
            .bind(config.lower_boundary)
            .bind(config.min_sample_size.get() as i32)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<Threshold>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM thresholds WHERE id = $1 AND project_id = $2");
        sqlx::query_as::<_, Threshold>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Threshold>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM thresholds WHERE project_id = $1 ORDER BY measure_id, id"
        );
        sqlx::query_as::<_, Threshold>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// All thresholds on a measure, regardless of branch/testbed scope.
    pub async fn list_for_measure(
        pool: &PgPool,
        project_id: DbId,
        measure_id: DbId,
    ) -> Result<Vec<Threshold>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM thresholds \
             WHERE project_id = $1 AND measure_id = $2 \
             ORDER BY id"
        );
        sqlx::query_as::<_, Threshold>(&query)
            .bind(project_id)
            .bind(measure_id)
            .fetch_all(pool)
            .await
    }

    /// Replace the boundaries and sample size. Returns `None` if not found.
    pub async fn update(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
        config: &ThresholdConfig,
    ) -> Result<Option<Threshold>, sqlx::Error> {
        let query = format!(
            "UPDATE thresholds SET \
                upper_boundary = $3, \
                lower_boundary = $4, \
                min_sample_size = $5, \
                updated_at = NOW() \
             WHERE id = $1 AND project_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Threshold>(&query)
            .bind(id)
            .bind(project_id)
            .bind(config.upper_boundary)
            .bind(config.lower_boundary)
            .bind(config.min_sample_size.get() as i32)
            .fetch_optional(pool)
            .await
    }

    /// Delete a threshold and its alerts. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, project_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM thresholds WHERE id = $1 AND project_id = $2")
            .bind(id)
            .bind(project_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
