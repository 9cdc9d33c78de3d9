use axum::routing::get;
use axum::Router;

use crate::handlers::threshold;
use crate::state::AppState;

/// Routes mounted at `/projects/{project_id}/thresholds`.
///
/// ```text
/// GET    /        -> list
/// POST   /        -> create
/// GET    /{id}    -> get_by_id
/// PUT    /{id}    -> update
/// DELETE /{id}    -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(threshold::list).post(threshold::create))
        .route(
            "/{id}",
            get(threshold::get_by_id)
                .put(threshold::update)
                .delete(threshold::delete),
        )
}
