//! Handlers for report submission and retrieval.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use driftwatch_core::error::CoreError;
use driftwatch_core::paging::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use driftwatch_core::report::{validate_submission, ReportSubmission, ReportVerdict};
use driftwatch_core::types::DbId;
use driftwatch_db::models::alert::AlertSummary;
use driftwatch_db::models::metric::Metric;
use driftwatch_db::models::report::Report;
use driftwatch_db::repositories::{AlertRepo, MetricRepo, ReportRepo};
use serde::Serialize;

use crate::engine::threshold_check;
use crate::error::{AppError, AppResult};
use crate::handlers::ensure_project;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// A report with its metrics, the alerts it raised and the overall verdict.
#[derive(Debug, Serialize)]
pub struct ReportDetail {
    pub report: Report,
    pub metrics: Vec<Metric>,
    pub alerts: Vec<AlertSummary>,
    pub verdict: ReportVerdict,
}

/// POST /api/v1/projects/{project_id}/reports
///
/// Stores the report and its metrics, then checks every metric against the
/// project's thresholds.
pub async fn submit(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<ReportSubmission>,
) -> AppResult<(StatusCode, Json<DataResponse<ReportDetail>>)> {
    ensure_project(&state.pool, project_id).await?;
    validate_submission(&input)?;

    let (report, metrics) = ReportRepo::create_with_metrics(&state.pool, project_id, &input).await?;
    tracing::info!(
        project_id,
        report_id = report.id,
        branch = %input.branch,
        testbed = %input.testbed,
        metric_count = metrics.len(),
        "Report stored"
    );

    let created = threshold_check::check_report(&state, &report, &metrics).await?;
    let verdict = ReportVerdict::from_alert_count(created.len());
    let alerts = if created.is_empty() {
        Vec::new()
    } else {
        AlertRepo::list_for_report(&state.pool, report.id).await?
    };

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ReportDetail {
                report,
                metrics,
                alerts,
                verdict,
            },
        }),
    ))
}

/// GET /api/v1/projects/{project_id}/reports
pub async fn list(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Report>>>> {
    ensure_project(&state.pool, project_id).await?;
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let offset = clamp_offset(params.offset);
    let reports = ReportRepo::list_for_project(&state.pool, project_id, limit, offset).await?;
    Ok(Json(DataResponse { data: reports }))
}

/// GET /api/v1/projects/{project_id}/reports/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<ReportDetail>>> {
    let report = ReportRepo::find_by_id(&state.pool, project_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Report",
            id,
        }))?;
    let metrics = MetricRepo::list_for_report(&state.pool, id).await?;
    let alerts = AlertRepo::list_for_report(&state.pool, id).await?;
    let verdict = ReportVerdict::from_alert_count(alerts.len());

    Ok(Json(DataResponse {
        data: ReportDetail {
            report,
            metrics,
            alerts,
            verdict,
        },
    }))
}
