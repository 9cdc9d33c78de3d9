//! Repository for the per-project dimension tables: `branches`, `testbeds`,
//! `benchmarks` and `measures`.

use driftwatch_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::dimension::{CreateMeasure, Dimension, DimensionTable, Measure};

/// Column list for branch/testbed/benchmark queries.
const COLUMNS: &str = "id, project_id, name, created_at";

/// Column list for `measures` queries.
const MEASURE_COLUMNS: &str = "id, project_id, name, units, created_at";

/// Provides query operations for named dimensions.
pub struct DimensionRepo;

impl DimensionRepo {
    /// List branches, testbeds or benchmarks of a project, ordered by name.
    ///
    /// Measures carry extra columns; use [`DimensionRepo::list_measures`].
    pub async fn list(
        pool: &PgPool,
        table: DimensionTable,
        project_id: DbId,
    ) -> Result<Vec<Dimension>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {} WHERE project_id = $1 ORDER BY name",
            table.table_name()
        );
        sqlx::query_as::<_, Dimension>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_measures(pool: &PgPool, project_id: DbId) -> Result<Vec<Measure>, sqlx::Error> {
        let query = format!(
            "SELECT {MEASURE_COLUMNS} FROM measures WHERE project_id = $1 ORDER BY name"
        );
        sqlx::query_as::<_, Measure>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Create a measure, or update the units of an existing one with the same name.
    pub async fn upsert_measure(
        pool: &PgPool,
        project_id: DbId,
        input: &CreateMeasure,
    ) -> Result<Measure, sqlx::Error> {
        let query = format!(
            "INSERT INTO measures (project_id, name, units) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (project_id, name) \
             DO UPDATE SET units = COALESCE(EXCLUDED.units, measures.units) \
             RETURNING {MEASURE_COLUMNS}"
        );
        sqlx::query_as::<_, Measure>(&query)
            .bind(project_id)
            .bind(&input.name)
            .bind(&input.units)
            .fetch_one(pool)
            .await
    }

    /// Whether `id` exists in `table` and belongs to `project_id`.
    pub async fn exists(
        pool: &PgPool,
        table: DimensionTable,
        project_id: DbId,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1 AND project_id = $2)",
            table.table_name()
        );
        sqlx::query_scalar::<_, bool>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_one(pool)
            .await
    }

    /// Return the id of the named row, creating it on first use.
    ///
    /// Runs on a caller-supplied connection so report ingestion can resolve
    /// every name inside its own transaction. Existing rows are read without
    /// taking a row lock; callers resolving several names must do so in a
    /// consistent order.
    pub async fn resolve_id(
        conn: &mut PgConnection,
        table: DimensionTable,
        project_id: DbId,
        name: &str,
    ) -> Result<DbId, sqlx::Error> {
        let insert = format!(
            "INSERT INTO {} (project_id, name) VALUES ($1, $2) \
             ON CONFLICT (project_id, name) DO NOTHING \
             RETURNING id",
            table.table_name()
        );
        let inserted = sqlx::query_scalar::<_, DbId>(&insert)
            .bind(project_id)
            .bind(name)
            .fetch_optional(&mut *conn)
            .await?;
        if let Some(id) = inserted {
            return Ok(id);
        }

        // Separate statement: its snapshot sees a row committed by a
        // concurrent insert we waited on.
        let select = format!(
            "SELECT id FROM {} WHERE project_id = $1 AND name = $2",
            table.table_name()
        );
        sqlx::query_scalar::<_, DbId>(&select)
            .bind(project_id)
            .bind(name)
            .fetch_one(&mut *conn)
            .await
    }
}
