use axum::routing::get;
use axum::Router;

use crate::handlers::report;
use crate::state::AppState;

/// Routes mounted at `/projects/{project_id}/reports`.
///
/// ```text
/// GET    /        -> list
/// POST   /        -> submit (store + evaluate thresholds)
/// GET    /{id}    -> get_by_id
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(report::list).post(report::submit))
        .route("/{id}", get(report::get_by_id))
}
