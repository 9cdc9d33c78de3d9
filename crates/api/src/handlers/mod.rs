//! HTTP handlers, one module per resource.

pub mod alert;
pub mod dimension;
pub mod metric;
pub mod project;
pub mod report;
pub mod threshold;

use driftwatch_core::error::CoreError;
use driftwatch_core::types::DbId;
use driftwatch_db::models::dimension::DimensionTable;
use driftwatch_db::models::project::Project;
use driftwatch_db::repositories::{DimensionRepo, ProjectRepo};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};

/// Load a project or fail with 404.
pub(crate) async fn ensure_project(pool: &PgPool, project_id: DbId) -> AppResult<Project> {
    ProjectRepo::find_by_id(pool, project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }))
}

/// Fail with 404 unless `id` is a row of `table` owned by `project_id`.
pub(crate) async fn ensure_in_project(
    pool: &PgPool,
    table: DimensionTable,
    project_id: DbId,
    id: DbId,
) -> AppResult<()> {
    if DimensionRepo::exists(pool, table, project_id, id).await? {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: table.entity(),
            id,
        }))
    }
}
