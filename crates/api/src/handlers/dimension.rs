//! Handlers for branches, testbeds, benchmarks and measures.
//!
//! All four are created on first use by report submission; measures can
//! also be declared up front so thresholds can be set before any data
//! arrives.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use driftwatch_core::error::CoreError;
use driftwatch_core::types::DbId;
use driftwatch_db::models::dimension::{CreateMeasure, Dimension, DimensionTable, Measure};
use driftwatch_db::repositories::DimensionRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::ensure_project;
use crate::response::DataResponse;
use crate::state::AppState;

async fn list_dimension(
    state: &AppState,
    table: DimensionTable,
    project_id: DbId,
) -> AppResult<Json<DataResponse<Vec<Dimension>>>> {
    ensure_project(&state.pool, project_id).await?;
    let rows = DimensionRepo::list(&state.pool, table, project_id).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// GET /api/v1/projects/{project_id}/branches
pub async fn list_branches(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Dimension>>>> {
    list_dimension(&state, DimensionTable::Branches, project_id).await
}

/// GET /api/v1/projects/{project_id}/testbeds
pub async fn list_testbeds(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Dimension>>>> {
    list_dimension(&state, DimensionTable::Testbeds, project_id).await
}

/// GET /api/v1/projects/{project_id}/benchmarks
pub async fn list_benchmarks(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Dimension>>>> {
    list_dimension(&state, DimensionTable::Benchmarks, project_id).await
}

/// GET /api/v1/projects/{project_id}/measures
pub async fn list_measures(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Measure>>>> {
    ensure_project(&state.pool, project_id).await?;
    let measures = DimensionRepo::list_measures(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: measures }))
}

/// POST /api/v1/projects/{project_id}/measures
///
/// Re-posting an existing name updates its units.
pub async fn create_measure(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateMeasure>,
) -> AppResult<(StatusCode, Json<DataResponse<Measure>>)> {
    ensure_project(&state.pool, project_id).await?;
    if input.name.is_empty() || input.name.len() > 255 {
        return Err(AppError::Core(CoreError::Validation(
            "name must be between 1 and 255 characters".to_string(),
        )));
    }
    let measure = DimensionRepo::upsert_measure(&state.pool, project_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: measure })))
}
