//! Report entity model.

use driftwatch_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A report row: one benchmark run on a branch/testbed.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Report {
    pub id: DbId,
    pub project_id: DbId,
    pub branch_id: DbId,
    pub testbed_id: DbId,
    pub git_hash: Option<String>,
    pub pr_number: Option<i32>,
    pub created_at: Timestamp,
}
