//! Handlers for the `/projects/{project_id}/thresholds` resource.
//!
//! Every mutation drops the project's cached threshold lists so the next
//! report is evaluated against the new configuration.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use driftwatch_core::error::CoreError;
use driftwatch_core::types::DbId;
use driftwatch_db::models::dimension::DimensionTable;
use driftwatch_db::models::threshold::{CreateThreshold, Threshold, UpdateThreshold};
use driftwatch_db::repositories::ThresholdRepo;

use crate::engine::threshold_check;
use crate::error::{AppError, AppResult};
use crate::handlers::{ensure_in_project, ensure_project};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Threshold",
        id,
    })
}

/// GET /api/v1/projects/{project_id}/thresholds
pub async fn list(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Threshold>>>> {
    ensure_project(&state.pool, project_id).await?;
    let thresholds = ThresholdRepo::list_for_project(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: thresholds }))
}

/// POST /api/v1/projects/{project_id}/thresholds
pub async fn create(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateThreshold>,
) -> AppResult<(StatusCode, Json<DataResponse<Threshold>>)> {
    ensure_project(&state.pool, project_id).await?;
    let config = input.config()?;

    ensure_in_project(&state.pool, DimensionTable::Measures, project_id, input.measure_id).await?;
    if let Some(branch_id) = input.branch_id {
        ensure_in_project(&state.pool, DimensionTable::Branches, project_id, branch_id).await?;
    }
    if let Some(testbed_id) = input.testbed_id {
        ensure_in_project(&state.pool, DimensionTable::Testbeds, project_id, testbed_id).await?;
    }

    let threshold =
        ThresholdRepo::create(&state.pool, project_id, input.measure_id, input.scope(), &config)
            .await?;
    threshold_check::invalidate_project(&state, project_id).await;

    tracing::info!(
        project_id,
        threshold_id = threshold.id,
        measure_id = threshold.measure_id,
        upper_boundary = ?threshold.upper_boundary,
        lower_boundary = ?threshold.lower_boundary,
        min_sample_size = threshold.min_sample_size,
        "Threshold created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: threshold })))
}

/// GET /api/v1/projects/{project_id}/thresholds/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Threshold>>> {
    let threshold = ThresholdRepo::find_by_id(&state.pool, project_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: threshold }))
}

/// PUT /api/v1/projects/{project_id}/thresholds/{id}
///
/// Omitted fields keep their current value; the merged configuration is
/// validated as a whole.
pub async fn update(
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateThreshold>,
) -> AppResult<Json<DataResponse<Threshold>>> {
    let current = ThresholdRepo::find_by_id(&state.pool, project_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let config = input.apply_to(&current)?;

    let threshold = ThresholdRepo::update(&state.pool, project_id, id, &config)
        .await?
        .ok_or_else(|| not_found(id))?;
    threshold_check::invalidate_project(&state, project_id).await;

    tracing::info!(project_id, threshold_id = id, "Threshold updated");
    Ok(Json(DataResponse { data: threshold }))
}

/// DELETE /api/v1/projects/{project_id}/thresholds/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if !ThresholdRepo::delete(&state.pool, project_id, id).await? {
        return Err(not_found(id));
    }
    threshold_check::invalidate_project(&state, project_id).await;
    tracing::info!(project_id, threshold_id = id, "Threshold deleted");
    Ok(StatusCode::NO_CONTENT)
}
