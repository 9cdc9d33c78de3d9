pub mod alert;
pub mod health;
pub mod project;
pub mod report;
pub mod threshold;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /projects                                         list, create
/// /projects/{project_id}                            get, delete
/// /projects/{project_id}/branches                   list
/// /projects/{project_id}/testbeds                   list
/// /projects/{project_id}/benchmarks                 list
/// /projects/{project_id}/measures                   list, create
/// /projects/{project_id}/metrics                    history
///
/// /projects/{project_id}/reports                    list, submit
/// /projects/{project_id}/reports/{id}               get
///
/// /projects/{project_id}/thresholds                 list, create
/// /projects/{project_id}/thresholds/{id}            get, update, delete
///
/// /projects/{project_id}/alerts                     list (?status=)
/// /projects/{project_id}/alerts/{id}                get
/// /projects/{project_id}/alerts/{id}/dismiss        active -> dismissed
/// /projects/{project_id}/alerts/{id}/resolve        active -> resolved
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/projects", project::router())
}
