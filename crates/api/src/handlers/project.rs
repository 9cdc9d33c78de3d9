//! Handlers for the `/projects` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use driftwatch_core::error::CoreError;
use driftwatch_core::naming::{slugify, validate_slug};
use driftwatch_core::paging::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use driftwatch_core::types::DbId;
use driftwatch_db::models::project::{CreateProject, Project};
use driftwatch_db::repositories::ProjectRepo;

use crate::engine::threshold_check;
use crate::error::{AppError, AppResult};
use crate::handlers::ensure_project;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/projects
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<DataResponse<Project>>)> {
    let name = input.name.trim();
    if name.is_empty() || name.len() > 255 {
        return Err(AppError::Core(CoreError::Validation(
            "name must be between 1 and 255 characters".to_string(),
        )));
    }
    let slug = match &input.slug {
        Some(slug) => slug.clone(),
        None => slugify(name),
    };
    validate_slug(&slug)?;

    let project = ProjectRepo::create(&state.pool, &input, &slug).await?;
    tracing::info!(project_id = project.id, slug = %project.slug, "Project created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: project })))
}

/// GET /api/v1/projects
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let offset = clamp_offset(params.offset);
    let projects = ProjectRepo::list(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse { data: projects }))
}

/// GET /api/v1/projects/{project_id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = ensure_project(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: project }))
}

/// DELETE /api/v1/projects/{project_id}
pub async fn delete(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ProjectRepo::delete(&state.pool, project_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }));
    }
    threshold_check::invalidate_project(&state, project_id).await;
    tracing::info!(project_id, "Project deleted");
    Ok(StatusCode::NO_CONTENT)
}
