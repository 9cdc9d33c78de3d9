//! Named per-project dimensions: branches, testbeds, benchmarks, measures.

use driftwatch_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Tables holding a `(project_id, name)` dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionTable {
    Branches,
    Testbeds,
    Benchmarks,
    Measures,
}

impl DimensionTable {
    pub fn table_name(self) -> &'static str {
        match self {
            Self::Branches => "branches",
            Self::Testbeds => "testbeds",
            Self::Benchmarks => "benchmarks",
            Self::Measures => "measures",
        }
    }

    /// Singular entity name for error messages.
    pub fn entity(self) -> &'static str {
        match self {
            Self::Branches => "Branch",
            Self::Testbeds => "Testbed",
            Self::Benchmarks => "Benchmark",
            Self::Measures => "Measure",
        }
    }
}

/// A branch, testbed or benchmark row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Dimension {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub created_at: Timestamp,
}

/// A measure row (latency, throughput, ...) with optional units.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Measure {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub units: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for declaring a measure ahead of the first report.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMeasure {
    pub name: String,
    pub units: Option<String>,
}
