//! Route definitions for the `/projects` resource.
//!
//! Reports, thresholds and alerts are nested under
//! `/projects/{project_id}/...`.

use axum::routing::get;
use axum::Router;

use crate::handlers::{dimension, metric, project};
use crate::routes::{alert, report, threshold};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                                  -> list
/// POST   /                                  -> create
/// GET    /{project_id}                      -> get_by_id
/// DELETE /{project_id}                      -> delete
/// GET    /{project_id}/branches             -> list_branches
/// GET    /{project_id}/testbeds             -> list_testbeds
/// GET    /{project_id}/benchmarks           -> list_benchmarks
/// GET    /{project_id}/measures             -> list_measures
/// POST   /{project_id}/measures             -> create_measure
/// GET    /{project_id}/metrics              -> history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route(
            "/{project_id}",
            get(project::get_by_id).delete(project::delete),
        )
        .route("/{project_id}/branches", get(dimension::list_branches))
        .route("/{project_id}/testbeds", get(dimension::list_testbeds))
        .route("/{project_id}/benchmarks", get(dimension::list_benchmarks))
        .route(
            "/{project_id}/measures",
            get(dimension::list_measures).post(dimension::create_measure),
        )
        .route("/{project_id}/metrics", get(metric::history))
        .nest("/{project_id}/reports", report::router())
        .nest("/{project_id}/thresholds", threshold::router())
        .nest("/{project_id}/alerts", alert::router())
}
