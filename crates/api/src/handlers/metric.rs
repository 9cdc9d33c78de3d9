//! Handler for metric history (trend) queries.

use axum::extract::{Path, Query, State};
use axum::Json;
use driftwatch_core::paging::{clamp_limit, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT};
use driftwatch_core::types::DbId;
use driftwatch_db::models::metric::{MetricHistoryFilter, MetricHistoryPoint};
use driftwatch_db::repositories::MetricRepo;

use crate::error::AppResult;
use crate::handlers::ensure_project;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/projects/{project_id}/metrics?benchmark_id=&measure_id=&branch_id=&testbed_id=&limit=
pub async fn history(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Query(filter): Query<MetricHistoryFilter>,
) -> AppResult<Json<DataResponse<Vec<MetricHistoryPoint>>>> {
    ensure_project(&state.pool, project_id).await?;
    let limit = clamp_limit(filter.limit, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT);
    let points = MetricRepo::history(&state.pool, project_id, &filter, limit).await?;
    Ok(Json(DataResponse { data: points }))
}
