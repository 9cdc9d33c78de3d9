use axum::routing::{get, post};
use axum::Router;

use crate::handlers::alert;
use crate::state::AppState;

/// Routes mounted at `/projects/{project_id}/alerts`.
///
/// ```text
/// GET    /                -> list (?status=&limit=&offset=)
/// GET    /{id}            -> get_by_id
/// POST   /{id}/dismiss    -> dismiss
/// POST   /{id}/resolve    -> resolve
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(alert::list))
        .route("/{id}", get(alert::get_by_id))
        .route("/{id}/dismiss", post(alert::dismiss))
        .route("/{id}/resolve", post(alert::resolve))
}
