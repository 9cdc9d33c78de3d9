//! Handlers for the `/projects/{project_id}/alerts` resource.

use axum::extract::{Path, Query, State};
use axum::Json;
use driftwatch_core::alert::{validate_transition, AlertStatus};
use driftwatch_core::error::CoreError;
use driftwatch_core::paging::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use driftwatch_core::types::DbId;
use driftwatch_db::models::alert::{Alert, AlertSummary};
use driftwatch_db::repositories::AlertRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::ensure_project;
use crate::query::AlertListParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Alert",
        id,
    })
}

/// GET /api/v1/projects/{project_id}/alerts?status=&limit=&offset=
pub async fn list(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Query(params): Query<AlertListParams>,
) -> AppResult<Json<DataResponse<Vec<AlertSummary>>>> {
    ensure_project(&state.pool, project_id).await?;
    let status = params.status.as_deref().map(AlertStatus::parse).transpose()?;
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let offset = clamp_offset(params.offset);

    let alerts = AlertRepo::list_for_project(&state.pool, project_id, status, limit, offset).await?;
    Ok(Json(DataResponse { data: alerts }))
}

/// GET /api/v1/projects/{project_id}/alerts/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<AlertSummary>>> {
    let alert = AlertRepo::find_by_id(&state.pool, project_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: alert }))
}

/// POST /api/v1/projects/{project_id}/alerts/{id}/dismiss
pub async fn dismiss(
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Alert>>> {
    transition(&state, project_id, id, AlertStatus::Dismissed).await
}

/// POST /api/v1/projects/{project_id}/alerts/{id}/resolve
pub async fn resolve(
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Alert>>> {
    transition(&state, project_id, id, AlertStatus::Resolved).await
}

async fn transition(
    state: &AppState,
    project_id: DbId,
    id: DbId,
    to: AlertStatus,
) -> AppResult<Json<DataResponse<Alert>>> {
    let current = AlertRepo::find_by_id(&state.pool, project_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let from = AlertStatus::parse(&current.status)?;
    validate_transition(from, to)?;

    let alert = AlertRepo::update_status(&state.pool, id, from, to)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(format!(
                "Alert {id} changed status concurrently"
            )))
        })?;

    tracing::info!(project_id, alert_id = id, from = from.as_str(), to = to.as_str(), "Alert status changed");
    Ok(Json(DataResponse { data: alert }))
}
