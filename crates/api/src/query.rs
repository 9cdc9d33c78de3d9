//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Generic pagination parameters (`?limit=&offset=`).
///
/// Values are clamped with `driftwatch_core::paging` before reaching the
/// repository layer.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for `GET /projects/{id}/alerts`.
#[derive(Debug, Default, Deserialize)]
pub struct AlertListParams {
    /// `active`, `dismissed` or `resolved`.
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
